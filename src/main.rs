mod cli;
mod input;
mod live;
mod logging;
mod replay;

fn main() -> anyhow::Result<()> {
    logging::init();
    cli::run()
}
