//! Date parts, distances and the offsets built from them.

use serde::{Deserialize, Serialize};

use crate::unit::Unit;

/// A sparse mapping from unit to count.
///
/// Used both as an offset (`{hour: 2, minute: 30}`) and as the decomposition
/// of a date or of the gap between two dates. Absent fields are omitted when
/// serialized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatePart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hour: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minute: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second: Option<i64>,
}

/// Carry thresholds, applied in this order so carries cascade upward in one
/// pass. Days carry into months at a flat 31.
const CARRIES: [(Unit, Unit, i64); 5] = [
    (Unit::Second, Unit::Minute, 60),
    (Unit::Minute, Unit::Hour, 60),
    (Unit::Hour, Unit::Day, 24),
    (Unit::Day, Unit::Month, 31),
    (Unit::Month, Unit::Year, 12),
];

impl DatePart {
    pub fn new() -> Self {
        DatePart::default()
    }

    pub fn with(mut self, unit: Unit, value: i64) -> Self {
        self.set(unit, value);
        self
    }

    pub fn get(&self, unit: Unit) -> Option<i64> {
        match unit {
            Unit::Second => self.second,
            Unit::Minute => self.minute,
            Unit::Hour => self.hour,
            Unit::Day => self.day,
            Unit::Week => self.week,
            Unit::Month => self.month,
            Unit::Year => self.year,
        }
    }

    pub fn set(&mut self, unit: Unit, value: i64) {
        *self.slot_mut(unit) = Some(value);
    }

    pub fn is_empty(&self) -> bool {
        Unit::ALL.iter().all(|&unit| self.get(unit).is_none())
    }

    /// Present fields, smallest unit first.
    pub fn iter(&self) -> impl Iterator<Item = (Unit, i64)> + '_ {
        Unit::ALL
            .into_iter()
            .filter_map(move |unit| self.get(unit).map(|value| (unit, value)))
    }

    /// Carries excess from each unit into the next larger one and drops zero
    /// fields.
    ///
    /// A field carries only when it is strictly greater than its threshold:
    /// `{second: 75}` becomes `{minute: 1, second: 15}` but `{second: 60}` is
    /// left as is. Weeks never take part. A carry that would overflow the
    /// larger unit saturates at `i64::MAX`.
    pub fn normalized(mut self) -> Self {
        for (from, into, limit) in CARRIES {
            self.carry(from, into, limit);
        }
        self.without_zeros()
    }

    pub fn without_zeros(mut self) -> Self {
        for unit in Unit::ALL {
            let slot = self.slot_mut(unit);
            if *slot == Some(0) {
                *slot = None;
            }
        }
        self
    }

    /// Sum of every present field converted to milliseconds.
    pub fn millis(&self) -> f64 {
        self.iter()
            .map(|(unit, value)| value as f64 * unit.multiplier() as f64)
            .sum()
    }

    fn carry(&mut self, from: Unit, into: Unit, limit: i64) {
        let Some(value) = self.get(from) else {
            return;
        };
        if value > limit {
            let carried = value / limit;
            let total = self.get(into).unwrap_or(0).saturating_add(carried);
            self.set(into, total);
            self.set(from, value - limit * carried);
        }
    }

    fn slot_mut(&mut self, unit: Unit) -> &mut Option<i64> {
        match unit {
            Unit::Second => &mut self.second,
            Unit::Minute => &mut self.minute,
            Unit::Hour => &mut self.hour,
            Unit::Day => &mut self.day,
            Unit::Week => &mut self.week,
            Unit::Month => &mut self.month,
            Unit::Year => &mut self.year,
        }
    }
}

/// A count of one unit, e.g. `{distance: 3, unit: "day"}`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Distance {
    pub distance: f64,
    pub unit: Unit,
}

impl Distance {
    pub fn new(distance: f64, unit: Unit) -> Self {
        Distance { distance, unit }
    }

    pub fn millis(&self) -> f64 {
        self.distance * self.unit.multiplier() as f64
    }
}

/// One argument to `next`/`last`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Offset {
    Distance(Distance),
    Parts(DatePart),
}

impl Offset {
    /// Offset length in milliseconds; date parts are normalized first.
    pub fn millis(&self) -> f64 {
        match self {
            Offset::Distance(distance) => distance.millis(),
            Offset::Parts(parts) => parts.normalized().millis(),
        }
    }
}

impl From<Distance> for Offset {
    fn from(distance: Distance) -> Self {
        Offset::Distance(distance)
    }
}

impl From<DatePart> for Offset {
    fn from(parts: DatePart) -> Self {
        Offset::Parts(parts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(pairs: &[(Unit, i64)]) -> DatePart {
        pairs
            .iter()
            .fold(DatePart::new(), |acc, &(unit, value)| acc.with(unit, value))
    }

    #[test]
    fn carries_cascade_upward() {
        let normalized =
            parts(&[(Unit::Second, 75), (Unit::Minute, 90), (Unit::Hour, 25)]).normalized();
        assert_eq!(
            normalized,
            parts(&[
                (Unit::Second, 15),
                (Unit::Minute, 31),
                (Unit::Hour, 2),
                (Unit::Day, 1)
            ])
        );
    }

    #[test]
    fn threshold_itself_does_not_carry() {
        let normalized = parts(&[(Unit::Second, 60), (Unit::Day, 31)]).normalized();
        assert_eq!(normalized, parts(&[(Unit::Second, 60), (Unit::Day, 31)]));
    }

    #[test]
    fn exact_multiples_drop_the_remainder() {
        let normalized = parts(&[(Unit::Second, 120)]).normalized();
        assert_eq!(normalized, parts(&[(Unit::Minute, 2)]));
    }

    #[test]
    fn days_carry_at_thirty_one() {
        let normalized = parts(&[(Unit::Day, 400)]).normalized();
        // 400 = 12 * 31 + 28, then 12 months stays below the 12-month threshold
        assert_eq!(normalized, parts(&[(Unit::Month, 12), (Unit::Day, 28)]));
        let normalized = parts(&[(Unit::Month, 25)]).normalized();
        assert_eq!(normalized, parts(&[(Unit::Year, 2), (Unit::Month, 1)]));
    }

    #[test]
    fn carries_saturate_at_the_top() {
        let normalized = parts(&[(Unit::Second, 120), (Unit::Minute, i64::MAX)]).normalized();
        assert_eq!(normalized.second, None);
        assert_eq!(normalized.minute, Some(i64::MAX % 60));
        assert!(normalized.hour.unwrap_or(0) <= 24);
        assert!(normalized.year.is_some());
        let normalized = parts(&[(Unit::Month, i64::MAX), (Unit::Year, i64::MAX)]).normalized();
        assert_eq!(normalized.year, Some(i64::MAX));
        assert_eq!(normalized.month, Some(i64::MAX % 12));
    }

    #[test]
    fn weeks_and_negatives_pass_through() {
        let normalized = parts(&[(Unit::Week, 9), (Unit::Second, -90)]).normalized();
        assert_eq!(normalized, parts(&[(Unit::Week, 9), (Unit::Second, -90)]));
    }

    #[test]
    fn zeros_are_dropped() {
        let normalized = parts(&[(Unit::Year, 0), (Unit::Hour, 3)]).normalized();
        assert_eq!(normalized, parts(&[(Unit::Hour, 3)]));
        assert!(DatePart::new().with(Unit::Day, 0).normalized().is_empty());
    }

    #[test]
    fn offset_millis() {
        let day = Offset::from(Distance::new(1.0, Unit::Day));
        assert_eq!(day.millis(), 86_400_000.0);
        let mixed = Offset::from(parts(&[(Unit::Minute, 15), (Unit::Second, 25)]));
        assert_eq!(mixed.millis(), 925_000.0);
    }

    #[test]
    fn offsets_deserialize_from_either_shape() {
        let distance: Offset = serde_json::from_str(r#"{"distance": 5, "unit": "year"}"#).unwrap();
        assert_eq!(distance, Offset::Distance(Distance::new(5.0, Unit::Year)));
        let parts_offset: Offset = serde_json::from_str(r#"{"second": 25, "minute": 15}"#).unwrap();
        assert_eq!(
            parts_offset,
            Offset::Parts(parts(&[(Unit::Minute, 15), (Unit::Second, 25)]))
        );
        assert!(serde_json::from_str::<Offset>(r#"{"fortnight": 1}"#).is_err());
    }

    #[test]
    fn serializes_sparsely() {
        let json = serde_json::to_string(&parts(&[(Unit::Year, 2), (Unit::Day, 14)])).unwrap();
        assert_eq!(json, r#"{"year":2,"day":14}"#);
    }
}
