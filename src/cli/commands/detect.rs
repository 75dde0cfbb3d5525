use crate::domain::ConvertError;
use crate::link;
use anyhow::Result;

/// URLの変換元・変換先を表示する（ネットワークアクセスなし）
pub fn execute_detect(url: &str) -> Result<()> {
    let url = url.trim();
    if !link::is_valid_url(url) {
        return Err(ConvertError::invalid_url(url).into());
    }

    if link::is_shortened(url) {
        println!("🔗 Short link. Run `playlist-convert expand {url}` to resolve it.");
        return Ok(());
    }

    let source = link::detect_platform(url)?;
    println!("{} → {}", source.display_name(), source.target().display_name());
    Ok(())
}
