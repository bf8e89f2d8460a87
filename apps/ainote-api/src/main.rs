use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = ainote_api::Args::parse();

	ainote_api::run(args).await
}
