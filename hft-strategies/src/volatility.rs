//! EWMA volatility estimator used to widen `InventoryMaker`'s spread in fast
//! markets. Ported from the teacher's `EwmaVolatility`, dropped from u64
//! fixed-point to `f64` and trimmed of the rolling-window/Parkinson
//! estimators the teacher shipped alongside it but this strategy doesn't use.

/// Exponentially weighted moving average of absolute returns, in basis
/// points. Gives more weight to recent observations than a flat window.
#[derive(Debug, Clone)]
pub struct EwmaVolatility {
    ewma_bps: f64,
    alpha: f64,
    last_price: Option<f64>,
    count: usize,
}

impl EwmaVolatility {
    /// `alpha` is the smoothing factor in `[0, 1]` (e.g. 0.2).
    pub fn new(alpha: f64) -> Self {
        Self {
            ewma_bps: 0.0,
            alpha: alpha.clamp(0.0, 1.0),
            last_price: None,
            count: 0,
        }
    }

    pub fn add_price(&mut self, price: f64) {
        let Some(last) = self.last_price else {
            self.last_price = Some(price);
            self.count = 1;
            return;
        };
        if last == 0.0 {
            self.last_price = Some(price);
            return;
        }
        let abs_return_bps = ((price - last) / last).abs() * 10_000.0;
        self.ewma_bps = self.alpha * abs_return_bps + (1.0 - self.alpha) * self.ewma_bps;
        self.last_price = Some(price);
        self.count += 1;
    }

    /// Current volatility estimate, in basis points.
    pub fn volatility_bps(&self) -> f64 {
        self.ewma_bps
    }

    pub fn is_ready(&self) -> bool {
        self.count >= 5
    }

    pub fn reset(&mut self) {
        self.ewma_bps = 0.0;
        self.last_price = None;
        self.count = 0;
    }
}
