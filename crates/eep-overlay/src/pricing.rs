//! Cost estimates over a timescale.

use eep_data::config::TICKS_PER_SECOND;
use eep_data::Timescale;

/// Electricity used over a timescale and what it costs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElectricityEstimate {
    pub watt_hours: f64,
    pub cost: f64,
}

/// Fluid moved over a timescale and what it costs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FluidEstimate {
    pub units: f64,
    pub litres: f64,
    pub cost: f64,
}

/// `watts_per_tick` is scaled to watts, multiplied by the timescale in hours,
/// and priced per kWh.
pub fn electricity_estimate(
    watts_per_tick: f64,
    timescale: &Timescale,
    price_per_kwh: f64,
) -> ElectricityEstimate {
    let watts = watts_per_tick * TICKS_PER_SECOND as f64;
    let watt_hours = watts * timescale.hours();
    ElectricityEstimate {
        watt_hours,
        cost: watt_hours / 1000.0 * price_per_kwh,
    }
}

/// `units_per_minute` over the timescale, converted to litres and priced per
/// litre. `units_per_litre` must be positive.
pub fn fluid_estimate(
    units_per_minute: f64,
    timescale: &Timescale,
    price_per_litre: f64,
    units_per_litre: f64,
) -> FluidEstimate {
    let units = units_per_minute * timescale.minutes();
    let litres = units / units_per_litre;
    FluidEstimate {
        units,
        litres,
        cost: litres * price_per_litre,
    }
}

/// Parse a price typed by a player. Accepts a decimal comma. Negative and
/// non-finite values are rejected.
pub fn parse_price(text: &str) -> Option<f64> {
    let price: f64 = text.trim().replace(',', ".").parse().ok()?;
    (price.is_finite() && price >= 0.0).then_some(price)
}

/// Fixed two-decimal amount followed by its unit.
pub fn format_amount(value: f64, unit: &str) -> String {
    format!("{value:.2} {unit}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use eep_data::OverlayConfig;
    use proptest::prelude::*;

    fn timescale(name: &str) -> Timescale {
        OverlayConfig::default()
            .timescale(name)
            .cloned()
            .unwrap()
    }

    #[test]
    fn one_hour_of_one_kilowatt() {
        // 1 kW is 1000/60 W per tick.
        let estimate = electricity_estimate(1000.0 / 60.0, &timescale("1h"), 0.3714);
        assert!((estimate.watt_hours - 1000.0).abs() < 1e-9);
        assert!((estimate.cost - 0.3714).abs() < 1e-9);
    }

    #[test]
    fn five_seconds_is_a_fraction_of_an_hour() {
        let estimate = electricity_estimate(60.0, &timescale("5s"), 1.0);
        // 3600 W for 5/3600 h.
        assert!((estimate.watt_hours - 5.0).abs() < 1e-9);
    }

    #[test]
    fn fluid_over_ten_minutes() {
        let estimate = fluid_estimate(300.0, &timescale("10m"), 0.5, 3.0);
        assert_eq!(estimate.units, 3000.0);
        assert_eq!(estimate.litres, 1000.0);
        assert_eq!(estimate.cost, 500.0);
    }

    #[test]
    fn price_parsing() {
        assert_eq!(parse_price("0.25"), Some(0.25));
        assert_eq!(parse_price("0,25"), Some(0.25));
        assert_eq!(parse_price(" 3 "), Some(3.0));
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("abc"), None);
        assert_eq!(parse_price("-1"), None);
        assert_eq!(parse_price("inf"), None);
    }

    #[test]
    fn amounts_use_two_decimals() {
        assert_eq!(format_amount(1.0, "Wh"), "1.00 Wh");
        assert_eq!(format_amount(0.126, "€"), "0.13 €");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn cost_scales_with_price(watts in 0.0..1.0e6f64, price in 0.0..10.0f64) {
            let ts = timescale("1m");
            let base = electricity_estimate(watts, &ts, 1.0);
            let priced = electricity_estimate(watts, &ts, price);
            prop_assert!((priced.cost - base.cost * price).abs() <= 1e-6 * base.cost.max(1.0));
            prop_assert_eq!(priced.watt_hours, base.watt_hours);
        }

        #[test]
        fn longer_timescales_never_cost_less(per_minute in 0.0..1.0e4f64, price in 0.0..10.0f64) {
            let timescales = OverlayConfig::default().timescales;
            let costs: Vec<f64> = timescales
                .iter()
                .map(|ts| fluid_estimate(per_minute, ts, price, 3.0).cost)
                .collect();
            prop_assert!(costs.windows(2).all(|w| w[0] <= w[1]));
        }
    }
}
