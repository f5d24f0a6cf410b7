use blood_report_service::tools::extract_report_text;
use tracing::{error, info};

/// Run the report extractor on a local PDF and print what the doctor would see.
/// Usage: cargo run --bin extract_report -- path/to/report.pdf
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let Some(path) = std::env::args().nth(1) else {
        error!("Usage: extract_report <path-to-pdf>");
        std::process::exit(2);
    };

    let text = extract_report_text(&path).await?;
    info!("Extracted {} characters", text.chars().count());
    println!("{}", text);

    Ok(())
}
