//! Ask/tell loop against the Cogneato service with a noisy toy metric.
//!
//! ```text
//! RUST_LOG=cg_asktell=debug cargo run -p cg-asktell --example ask_tell_loop [endpoint]
//! ```

use cg_asktell::{AskTell, ParameterValue, Parameters};

/// Noisy quadratic peaked at x = 0.3, best at category 2.
fn measure(params: &Parameters, round: usize) -> f64 {
    let x = params.get("x").map(ParameterValue::as_f64).unwrap_or_default();
    let c = params.get("c").map(ParameterValue::as_f64).unwrap_or_default();
    let wobble = ((round as f64) * 12.9898 + x * 78.233).sin() * 0.05;
    -(x - 0.3).powi(2) + 0.1 * c + wobble
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cg_asktell=info".parse()?),
        )
        .init();

    let endpoint = std::env::args().nth(1);
    let mut session = AskTell::new(&["x:[0,1]", "c:{0,1,2}"], endpoint.as_deref())?;

    for round in 0..5 {
        let arms = session.ask(4)?;
        let phis: Vec<f64> = arms.iter().map(|arm| measure(arm, round)).collect();
        session.tell(&arms, &phis, None)?;

        if let Some(favorite) = session.favorite() {
            println!("round {round}: favorite {:?} (est {:.4})", favorite.params, favorite.phi);
        }
    }

    if let Some(best) = session.best() {
        println!("best observed: {:?} -> {:.4}", best.params, best.phi);
    }
    Ok(())
}
