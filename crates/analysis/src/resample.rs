use common::Candle;

/// Fold every `factor` consecutive candles into one, starting from the first.
///
/// A trailing partial group still produces a (still forming) bar. Factors of
/// 0 or 1 return the input unchanged.
pub fn resample(candles: &[Candle], factor: usize) -> Vec<Candle> {
    if factor <= 1 {
        return candles.to_vec();
    }
    candles
        .chunks(factor)
        .filter_map(|group| {
            let first = group.first()?;
            let last = group.last()?;
            Some(Candle {
                time: first.time,
                open: first.open,
                high: group.iter().map(|c| c.high).fold(f64::MIN, f64::max),
                low: group.iter().map(|c| c.low).fold(f64::MAX, f64::min),
                close: last.close,
                volume: group.iter().map(|c| c.volume).sum(),
            })
        })
        .collect()
}
