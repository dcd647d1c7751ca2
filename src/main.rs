mod board;
mod session;
mod ui;

use rand::thread_rng;

use session::Session;

fn main() -> std::io::Result<()> {
    let mut rng = thread_rng();
    let session = Session::new(&mut rng);
    ui::run(session, rng)
}
