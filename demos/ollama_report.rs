use client_financial_reports::*;
use dotenv::dotenv;
use std::env;
use std::error::Error;

fn main() -> std::result::Result<(), Box<dyn Error>> {
    dotenv().ok();

    let transactions_path =
        env::var("TRANSACTIONS_CSV").unwrap_or_else(|_| "data/transactions_data.csv".to_string());
    let mcc_path = env::var("MCC_CODES_JSON").unwrap_or_else(|_| "data/mcc_codes.json".to_string());
    let config = match env::var("REPORT_CONFIG") {
        Ok(path) => ReportConfig::from_json_file(path)?,
        Err(_) => ReportConfig::default(),
    };

    let mut args = env::args().skip(1);
    let client_id: i64 = args.next().unwrap_or_else(|| "126".to_string()).parse()?;
    let request = args
        .next()
        .unwrap_or_else(|| "Dame el informe del segundo mes de 2021".to_string());

    println!("📂 Loading transactions from {}", transactions_path);
    let transactions = load_transactions(&transactions_path)?;
    let catalog = MccCatalog::from_json_file(&mcc_path)?;
    println!(
        "✅ {} transactions, {} category codes\n",
        transactions.len(),
        catalog.len()
    );

    let range = DateExtractor::from_config(&config).require(&request)?;
    let reporter = ClientReporter::new(&config, PngChartRenderer::default());

    let totals = reporter.earnings_and_expenses(&transactions, client_id, &range)?;
    println!("💰 Earnings {:.2} / Expenses {:.2}", totals.earnings, totals.expenses);

    let categories = reporter.expenses_summary(&transactions, client_id, &range, &catalog)?;
    println!("\n📊 Expenses by category ({})", range);
    for row in &categories {
        println!(
            "  {:<40} {:>10.2}  ({} transactions)",
            row.category.as_deref().unwrap_or(UNKNOWN_CATEGORY_LABEL),
            row.total,
            row.transactions
        );
    }

    println!("\n📈 Cash flow");
    for row in reporter.cash_flow_summary(&transactions, client_id, &range) {
        println!(
            "  {:<12} in {:>10.2}  out {:>10.2}  net {:>10.2}  savings {:>6.2}%",
            row.period, row.inflows, row.outflows, row.net, row.savings_pct
        );
    }

    let mut client = OllamaClient::from_config(&config);
    if let Ok(url) = env::var("OLLAMA_BASE_URL") {
        client = client.with_base_url(url);
    }
    println!("\n🤖 Asking {} for the narrative...", client.model());

    let agent = ReportAgent::new(&config, client, PdfReportWriter);
    let outcome = agent.run(&transactions, client_id, &request)?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    match outcome.report_path {
        Some(path) => println!("📄 Report written to {}", path.display()),
        None => println!("⚠️  No transactions in range, no report written"),
    }

    Ok(())
}
