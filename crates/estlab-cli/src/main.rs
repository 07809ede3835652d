mod command;
mod logging;
mod report;
mod util;

fn main() -> anyhow::Result<()> {
    logging::init();
    command::run()
}
