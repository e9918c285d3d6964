use augur::SeriesProvider;
use std::sync::Arc;

/// Mock provider when `AUGUR_EXAMPLES_USE_MOCK` is set, live Yahoo data otherwise.
pub fn get_provider() -> Result<Arc<dyn SeriesProvider>, augur::AugurError> {
    if std::env::var("AUGUR_EXAMPLES_USE_MOCK").is_ok() {
        println!("--- (Using Mock Provider for CI) ---");
        Ok(Arc::new(augur_mock::MockProvider::new()))
    } else {
        Ok(Arc::new(augur_yahoo::YahooProvider::new()?))
    }
}
