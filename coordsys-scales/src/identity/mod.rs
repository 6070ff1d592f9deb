/// Passes values through unchanged. Used for axes whose data is already in
/// pixel space.
#[derive(Debug, Clone, Default)]
pub struct IdentityScale;

impl IdentityScale {
    pub fn new() -> Self {
        Self
    }

    pub fn scale_value(&self, value: f64) -> f64 {
        value
    }
}
