use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = reco_api::Args::parse();

	reco_api::run(args).await
}
