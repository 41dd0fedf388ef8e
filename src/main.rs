use project_log::cli::commands::run;

fn main() -> anyhow::Result<()> {
    run()
}
