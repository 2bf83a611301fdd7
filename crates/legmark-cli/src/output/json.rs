use legmark_core::error::LegmarkError;
use serde::Serialize;

pub fn print<T: Serialize + ?Sized>(value: &T) -> Result<(), LegmarkError> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}
