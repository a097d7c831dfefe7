use stress_test::{stress_test_scaling, stress_test_siblings};
use tracing_subscriber::EnvFilter;

fn main() {
    let filter = EnvFilter::try_from_env("QUORRA_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(err) => {
            eprintln!("failed to start runtime: {}", err);
            std::process::exit(1);
        }
    };
    if let Err(err) = rt.block_on(async_main()) {
        eprintln!("\n✗ Stress test failed: {}", err);
        std::process::exit(1);
    }
}

async fn async_main() -> qrc_client::Result<()> {
    println!("\n\n╔════════════════════════════════════════════════════════════╗");
    println!("║            SIBLING STRESS TESTS                            ║");
    println!("╚════════════════════════════════════════════════════════════╝");

    // Few writers, many keys: siblings stay shallow
    let stats = stress_test_siblings(4, 100, 50).await?;
    stats.print();

    // Many writers, few keys: deep sibling lists
    let stats = stress_test_siblings(10, 200, 5).await?;
    stats.print();

    stress_test_scaling(20, 5).await?;

    println!("\n✓ All stress tests completed successfully!");
    Ok(())
}
