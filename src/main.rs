use tracer_app::{cli, config::Config};

fn main() -> anyhow::Result<()> {
    tracer_app::init_logging();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut config = Config::default();
    cli::apply_args(&mut config, &args).map_err(anyhow::Error::msg)?;

    log::info!(
        "Render settings:\n{} threads\n{} samples per pixel\n{} max ray bounces\n",
        config.threads,
        config.samples_per_pixel,
        config.max_bounces,
    );

    tracer_app::run(&config)?;
    Ok(())
}
