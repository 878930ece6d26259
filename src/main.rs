use tendril::cli::CommandLineInterface;

fn main() -> anyhow::Result<()> {
    tendril::init_tracing();
    let command_line_interface = CommandLineInterface::load();
    command_line_interface.run()
}
