//! Fixed price bands for the dashboard histogram.
//!
//! Lower bounds are inclusive, upper bounds exclusive. Sale and rent use
//! separate bands; a listing falls in exactly one band of its own type.

use rust_decimal::Decimal;

use crate::domains::listings::models::{ListingType, PriceRange};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceBucket {
    pub label: &'static str,
    pub listing_type: ListingType,
    pub range: PriceRange,
}

const SALE_BANDS: [(&str, Option<i64>, Option<i64>); 5] = [
    ("<50k", None, Some(50_000)),
    ("50k–100k", Some(50_000), Some(100_000)),
    ("100k–200k", Some(100_000), Some(200_000)),
    ("200k–500k", Some(200_000), Some(500_000)),
    ("≥500k", Some(500_000), None),
];

const RENT_BANDS: [(&str, Option<i64>, Option<i64>); 3] = [
    ("<500/mo", None, Some(500)),
    ("500–1000/mo", Some(500), Some(1_000)),
    ("≥1000/mo", Some(1_000), None),
];

/// Every band in display order: sale bands first, then rent.
pub fn price_buckets() -> Vec<PriceBucket> {
    let sale = SALE_BANDS.iter().map(|band| bucket(ListingType::Sale, band));
    let rent = RENT_BANDS.iter().map(|band| bucket(ListingType::Rent, band));
    sale.chain(rent).collect()
}

fn bucket(
    listing_type: ListingType,
    (label, min, max): &(&'static str, Option<i64>, Option<i64>),
) -> PriceBucket {
    PriceBucket {
        label,
        listing_type,
        range: PriceRange {
            min: min.map(Decimal::from),
            max: max.map(Decimal::from),
        },
    }
}

/// The band a listing of this type and price belongs to
#[cfg(test)]
fn bucket_for(listing_type: ListingType, price: Decimal) -> Option<&'static str> {
    price_buckets()
        .into_iter()
        .find(|b| b.listing_type == listing_type && b.range.contains(price))
        .map(|b| b.label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries_belong_to_upper_band() {
        assert_eq!(bucket_for(ListingType::Sale, Decimal::from(49_999)), Some("<50k"));
        assert_eq!(bucket_for(ListingType::Sale, Decimal::from(50_000)), Some("50k–100k"));
        assert_eq!(bucket_for(ListingType::Sale, Decimal::from(500_000)), Some("≥500k"));
        assert_eq!(bucket_for(ListingType::Rent, Decimal::from(500)), Some("500–1000/mo"));
        assert_eq!(bucket_for(ListingType::Rent, Decimal::from(1_000)), Some("≥1000/mo"));
        assert_eq!(bucket_for(ListingType::Rent, Decimal::ZERO), Some("<500/mo"));
    }

    #[test]
    fn test_each_type_has_exactly_one_band_per_price() {
        let prices = [0, 499, 500, 999, 1_000, 75_000, 199_999, 2_000_000];
        for listing_type in [ListingType::Sale, ListingType::Rent] {
            for price in prices {
                let matches = price_buckets()
                    .iter()
                    .filter(|b| b.listing_type == listing_type)
                    .filter(|b| b.range.contains(Decimal::from(price)))
                    .count();
                assert_eq!(matches, 1, "{} at {}", listing_type, price);
            }
        }
    }

    #[test]
    fn test_sale_bands_come_first() {
        let types: Vec<ListingType> = price_buckets().iter().map(|b| b.listing_type).collect();
        assert_eq!(&types[..5], &[ListingType::Sale; 5]);
        assert_eq!(&types[5..], &[ListingType::Rent; 3]);
    }
}
