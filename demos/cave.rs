//! Terminal cave exploration demo.
//!
//! Run: cargo run --bin cave -- [seed] [turns]
//! Set `RUST_LOG=debug` to watch the engines work.

use std::thread;
use std::time::Duration;

use tilegrid_demos::Demo;

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);
    let turns: u32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(60);

    let mut demo = match Demo::new(seed) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    for _ in 0..turns {
        let frame = demo
            .step()
            .and_then(|()| Ok((demo.render()?, demo.status()?)));
        match frame {
            Ok((view, status)) => {
                println!("\x1b[2J\x1b[H{view}{status}");
            }
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
        thread::sleep(Duration::from_millis(80));
    }
    log::info!("finished after {} turns", demo.turn());
}
