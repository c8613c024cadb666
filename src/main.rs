#[tokio::main]
async fn main() {
  let mut args = std::env::args().skip(1);
  if let Some(arg) = args.next() {
    if arg == "--version" || arg == "-V" {
      println!("verimail {}", env!("CARGO_PKG_VERSION"));
      return;
    }
    if arg == "--help" || arg == "-h" {
      eprintln!("Usage: verimail [--version]");
      eprintln!("Configuration is read from VERIMAIL_* environment variables.");
      return;
    }
  }

  if let Err(e) = verimail::app::run().await {
    eprintln!("error: {e}");
    std::process::exit(1);
  }
}
