/// Transferrin saturation (%) from serum iron and TIBC.
///
/// Rounded half-up to a whole percent. `None` unless both inputs are known
/// and TIBC is non-zero.
pub fn derive_tsat(serum_iron: Option<f64>, tibc: Option<f64>) -> Option<f64> {
    let (serum_iron, tibc) = (serum_iron?, tibc?);
    if tibc == 0.0 {
        return None;
    }
    let tsat = (serum_iron / tibc * 100.0 + 0.5).floor();
    tsat.is_finite().then_some(tsat)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_tsat() {
        assert_eq!(derive_tsat(Some(60.0), Some(300.0)), Some(20.0));
        // 33.33 rounds down, 12.5 rounds up
        assert_eq!(derive_tsat(Some(100.0), Some(300.0)), Some(33.0));
        assert_eq!(derive_tsat(Some(25.0), Some(200.0)), Some(13.0));
    }

    #[test]
    fn test_derive_tsat_requires_both_values() {
        assert_eq!(derive_tsat(None, Some(300.0)), None);
        assert_eq!(derive_tsat(Some(60.0), None), None);
        assert_eq!(derive_tsat(Some(60.0), Some(0.0)), None);
    }
}
