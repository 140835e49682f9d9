//! Selling treasure for coin.

use caravan_core::caravan::Currency;
use caravan_core::document::CaravanDocument;
use caravan_core::item::{ItemData, ItemId};
use serde::Serialize;

use crate::config::ConvertOptions;
use crate::error::EngineResult;

/// Result of a conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertOutcome {
    /// The document with treasure sold.
    pub document: CaravanDocument,
    /// What was paid out.
    pub report: ConvertReport,
}

/// What a conversion paid out.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConvertReport {
    /// Total value in gold pieces.
    pub value_gp: f64,
    /// Coins added to the purse.
    pub gained: Currency,
    /// Names of sold treasure.
    pub sold: Vec<String>,
    /// Whether sold treasure was removed.
    pub deleted: bool,
}

/// Sell every treasure with a positive quantity at its listed price.
///
/// The value is added to the purse, split into coins. Sold treasure is
/// removed when `options.delete` is set, otherwise left with quantity 0.
pub fn convert_treasure(doc: &CaravanDocument, options: &ConvertOptions) -> EngineResult<ConvertOutcome> {
    let sold: Vec<(ItemId, String, f64)> = doc
        .items()
        .iter()
        .filter_map(|item| {
            let treasure = item.as_treasure()?;
            (treasure.quantity > 0).then(|| {
                (item.id, item.name.clone(), treasure.price * treasure.quantity as f64)
            })
        })
        .collect();

    let value_gp: f64 = sold.iter().map(|(_, _, value)| value).sum();
    let gained = Currency::split((value_gp * 100.0).round() as i64, options.use_platinum);

    let mut document = doc.clone();
    document.system.currency = document.system.currency + gained;
    for (id, _, _) in &sold {
        if options.delete {
            document.remove_item(*id)?;
        } else if let Some(item) = document.get_item_mut(*id) {
            if let ItemData::Treasure(treasure) = &mut item.data {
                treasure.quantity = 0;
            }
        }
    }

    tracing::debug!(
        caravan = %doc.name,
        sold = sold.len(),
        value_gp,
        "treasure converted"
    );
    Ok(ConvertOutcome {
        document,
        report: ConvertReport {
            value_gp,
            gained,
            sold: sold.into_iter().map(|(_, name, _)| name).collect(),
            deleted: options.delete,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use caravan_core::item::{ItemKind, Treasure};

    fn hoard() -> CaravanDocument {
        let mut doc = CaravanDocument::default();
        doc.system.currency.gp = 5;
        doc.attach(
            "Silver chalice",
            ItemData::Treasure(Treasure {
                quantity: 2,
                price: 12.35,
                ..Treasure::default()
            }),
        );
        doc.attach(
            "Crown",
            ItemData::Treasure(Treasure {
                quantity: 1,
                price: 1500.0,
                ..Treasure::default()
            }),
        );
        doc.attach(
            "Empty sack",
            ItemData::Treasure(Treasure {
                quantity: 0,
                price: 99.0,
                ..Treasure::default()
            }),
        );
        doc
    }

    #[test]
    fn sells_into_gold_by_default() {
        let outcome = convert_treasure(&hoard(), &ConvertOptions::default()).unwrap();
        assert_eq!(
            outcome.report.gained,
            Currency { pp: 0, gp: 1524, sp: 7, cp: 0 }
        );
        assert_eq!(outcome.document.system.currency.gp, 1529);
        assert_eq!(outcome.report.sold, vec!["Silver chalice", "Crown"]);
    }

    #[test]
    fn zeroes_quantity_without_delete() {
        let outcome = convert_treasure(&hoard(), &ConvertOptions::default()).unwrap();
        let remaining: Vec<_> = outcome
            .document
            .items_of_kind(ItemKind::Treasure)
            .filter_map(|i| i.as_treasure())
            .map(|t| t.quantity)
            .collect();
        assert_eq!(remaining, vec![0, 0, 0]);
    }

    #[test]
    fn delete_removes_sold_treasure() {
        let options = ConvertOptions::default().with_delete(true).with_platinum(true);
        let outcome = convert_treasure(&hoard(), &options).unwrap();
        assert_eq!(outcome.document.item_count(), 1);
        assert_eq!(
            outcome.report.gained,
            Currency { pp: 152, gp: 4, sp: 7, cp: 0 }
        );
        assert!(outcome.report.deleted);
    }

    #[test]
    fn nothing_to_sell() {
        let doc = CaravanDocument::default();
        let outcome = convert_treasure(&doc, &ConvertOptions::default()).unwrap();
        assert_eq!(outcome.report.gained, Currency::default());
        assert_eq!(outcome.document, doc);
    }
}
