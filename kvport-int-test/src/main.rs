use kvport::errors::KvPortResult;
use kvport::store::BackendKind;
use kvport::transfer::transfer;
use kvport::transfer_config::TransferConfig;
use kvport_int_test::test_util::{cleanup, create_test_context, seed_forum, snapshot};

fn main() -> KvPortResult<()> {
    colog::init();
    println!("Starting transfer demo...");
    let ctx = create_test_context();

    let source = ctx.connect(BackendKind::Memory)?;
    seed_forum(&source)?;
    source.close()?;

    let config = TransferConfig::builder()
        .source(BackendKind::Memory)
        .destination(BackendKind::Fjall)
        .build()?;

    let start = std::time::Instant::now();
    let outcome = transfer(&config, ctx.registry());
    let elapsed = start.elapsed();

    if let Some(failure) = outcome.failure() {
        println!("Transfer failed after {:?}: {}", elapsed, failure);
        let error = failure.error().clone();
        cleanup(ctx);
        return Err(error);
    }
    println!("OK");
    println!("Transferred in {:?}: {}", elapsed, outcome.report());

    let destination = ctx.connect(BackendKind::Fjall)?;
    for (key, value) in snapshot(&destination)? {
        println!("  {} => {}", key, value);
    }
    destination.close()?;

    cleanup(ctx);
    Ok(())
}
