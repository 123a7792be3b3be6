use vypiska_core::error::VypiskaError;
use vypiska_core::BatchOutcome;

pub fn print(outcome: &BatchOutcome) -> Result<(), VypiskaError> {
    let json = serde_json::to_string_pretty(outcome)?;
    println!("{json}");
    Ok(())
}
