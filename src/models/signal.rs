use log::info;

use crate::models::{PriceSeries, SignalResult};
use crate::utils::trailing_mean;

pub const SHORT_WINDOW: usize = 50;
pub const LONG_WINDOW: usize = 200;

/// Golden/death cross on the latest bar: BUY when MA50 is above MA200.
pub fn signal(series: &PriceSeries) -> SignalResult {
    let records = series.len();
    if records < LONG_WINDOW {
        return SignalResult::InsufficientData { records };
    }

    let closes = series.closes();
    let (Some(ma_short), Some(ma_long)) = (
        trailing_mean(&closes, SHORT_WINDOW),
        trailing_mean(&closes, LONG_WINDOW),
    ) else {
        return SignalResult::InsufficientData { records };
    };

    info!("MA{}: {:.4}, MA{}: {:.4}", SHORT_WINDOW, ma_short, LONG_WINDOW, ma_long);

    if ma_short > ma_long {
        SignalResult::Buy
    } else {
        SignalResult::Sell
    }
}
