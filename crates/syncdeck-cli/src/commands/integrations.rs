use syncdeck_core::error::Result;
use syncdeck_core::IntegrationKind;

pub fn run() -> Result<()> {
    for kind in IntegrationKind::ALL {
        println!("{:<10} {:<10} {}", kind.slug(), kind.display_name(), kind.category());
    }
    Ok(())
}
