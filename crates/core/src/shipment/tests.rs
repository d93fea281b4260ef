//! Scenario and property tests for the shipment calculator.

use std::collections::BTreeMap;

use landed_shared::types::{CurrencyCode, ExpenseCategoryId, ProductId};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::calculator::ShipmentCalculator;
use super::types::{SharedCost, Shipment, ShipmentItem};
use crate::allocation::CalculationMethod;
use crate::catalog::{ExpenseCategory, InMemoryCategoryCatalog};
use crate::error::LandedCostError;

const FREIGHT: i64 = 1;
const INSURANCE: i64 = 2;

fn catalog() -> InMemoryCategoryCatalog {
    InMemoryCategoryCatalog::new([
        ExpenseCategory {
            id: ExpenseCategoryId::new(FREIGHT),
            name: "Freight".into(),
            description: None,
            allows_item_override: true,
        },
        ExpenseCategory {
            id: ExpenseCategoryId::new(INSURANCE),
            name: "Insurance".into(),
            description: None,
            allows_item_override: false,
        },
    ])
}

fn item(product_id: Option<i64>, quantity: Decimal, unit_cost: Decimal) -> ShipmentItem {
    ShipmentItem {
        product_id: product_id.map(ProductId::new),
        item_name: format!("Item {}", product_id.unwrap_or_default()),
        quantity,
        unit_cost,
        weight: None,
    }
}

fn cost(category: i64, amount: Decimal) -> SharedCost {
    SharedCost {
        expense_category_id: ExpenseCategoryId::new(category),
        description: "Sea freight".into(),
        amount,
        manual_allocations: BTreeMap::new(),
    }
}

/// Two items, quantities [10, 5], unit costs [100, 200], one 200 freight cost.
fn two_item_shipment(method: CalculationMethod) -> Shipment {
    Shipment {
        name: Some("SHIP-2024-001".into()),
        shipment_date: None,
        calculation_method: method,
        base_currency: CurrencyCode::usd(),
        exchange_rate: Decimal::ONE,
        items: vec![
            item(Some(11), dec!(10), dec!(100)),
            item(Some(12), dec!(5), dec!(200)),
        ],
        shared_costs: vec![cost(FREIGHT, dec!(200))],
    }
}

// =========================================================================
// Worked scenarios
// =========================================================================

#[test]
fn test_proportional_scenario() {
    let catalog = catalog();
    let result = ShipmentCalculator::new(&catalog)
        .calculate(&two_item_shipment(CalculationMethod::Proportional))
        .unwrap();

    assert_eq!(result.items[0].total_item_cost, dec!(1000));
    assert_eq!(result.items[1].total_item_cost, dec!(1000));
    assert_eq!(result.items[0].allocated_shared_cost, dec!(100));
    assert_eq!(result.items[1].allocated_shared_cost, dec!(100));
    assert_eq!(result.items[0].landed_cost_per_unit, dec!(110));
    assert_eq!(result.items[1].landed_cost_per_unit, dec!(220));
    assert_eq!(result.items[0].percentage_share, dec!(0.5));

    let summary = &result.calculation_summary;
    assert_eq!(summary.total_shipment_base_cost, dec!(2000));
    assert_eq!(summary.total_shared_costs, dec!(200));
    assert_eq!(summary.grand_total_landed_cost, dec!(2200));
    assert_eq!(summary.calculation_method, CalculationMethod::Proportional);
}

#[test]
fn test_equal_scenario_matches_proportional() {
    let catalog = catalog();
    let calculator = ShipmentCalculator::new(&catalog);
    let equal = calculator
        .calculate(&two_item_shipment(CalculationMethod::Equal))
        .unwrap();
    let proportional = calculator
        .calculate(&two_item_shipment(CalculationMethod::Proportional))
        .unwrap();

    assert_eq!(equal.items[0].allocated_shared_cost, dec!(100));
    assert_eq!(equal.items[1].allocated_shared_cost, dec!(100));
    for (a, b) in equal.items.iter().zip(&proportional.items) {
        assert_eq!(a.total_landed_cost, b.total_landed_cost);
    }
}

#[test]
fn test_manual_override_scenario() {
    let catalog = catalog();
    let mut shipment = two_item_shipment(CalculationMethod::Proportional);
    shipment.shared_costs[0].manual_allocations = BTreeMap::from([(0, dec!(150)), (1, dec!(50))]);

    let result = ShipmentCalculator::new(&catalog).calculate(&shipment).unwrap();
    assert_eq!(result.items[0].total_landed_cost, dec!(1150));
    assert_eq!(result.items[1].total_landed_cost, dec!(1050));
    assert!(result.shared_costs[0].has_manual_override());
    assert_eq!(result.calculation_summary.grand_total_landed_cost, dec!(2200));
}

#[test]
fn test_override_only_replaces_its_own_cost() {
    let catalog = catalog();
    let mut shipment = two_item_shipment(CalculationMethod::Proportional);
    shipment.shared_costs[0].manual_allocations = BTreeMap::from([(0, dec!(200)), (1, dec!(0))]);
    shipment.shared_costs.push(cost(INSURANCE, dec!(50)));

    let result = ShipmentCalculator::new(&catalog).calculate(&shipment).unwrap();
    assert_eq!(result.items[0].allocated_shared_cost, dec!(225));
    assert_eq!(result.items[1].allocated_shared_cost, dec!(25));
    assert!(!result.shared_costs[1].has_manual_override());
}

// =========================================================================
// Degenerate and error cases
// =========================================================================

#[test]
fn test_no_shared_costs() {
    let catalog = catalog();
    let mut shipment = two_item_shipment(CalculationMethod::Equal);
    shipment.shared_costs.clear();

    let result = ShipmentCalculator::new(&catalog).calculate(&shipment).unwrap();
    assert!(result.items.iter().all(|i| i.allocated_shared_cost.is_zero()));
    assert_eq!(result.items[0].landed_cost_per_unit, dec!(100));
    assert_eq!(result.calculation_summary.grand_total_landed_cost, dec!(2000));
}

#[test]
fn test_zero_base_cost_proportional_allocates_nothing() {
    let catalog = catalog();
    let mut shipment = two_item_shipment(CalculationMethod::Proportional);
    for item in &mut shipment.items {
        item.unit_cost = Decimal::ZERO;
    }

    let result = ShipmentCalculator::new(&catalog).calculate(&shipment).unwrap();
    assert!(result.items.iter().all(|i| i.allocated_shared_cost.is_zero()));
    assert!(result.items.iter().all(|i| i.percentage_share.is_zero()));
    // the shared cost still counts toward the shipment total
    assert_eq!(result.calculation_summary.grand_total_landed_cost, dec!(200));
}

#[test]
fn test_weight_based_without_weights_allocates_nothing() {
    let catalog = catalog();
    let result = ShipmentCalculator::new(&catalog)
        .calculate(&two_item_shipment(CalculationMethod::WeightBased))
        .unwrap();
    assert!(result.items.iter().all(|i| i.allocated_shared_cost.is_zero()));
}

#[test]
fn test_weight_based_uses_weights() {
    let catalog = catalog();
    let mut shipment = two_item_shipment(CalculationMethod::WeightBased);
    shipment.items[0].weight = Some(dec!(3));
    shipment.items[1].weight = Some(dec!(1));

    let result = ShipmentCalculator::new(&catalog).calculate(&shipment).unwrap();
    assert_eq!(result.items[0].allocated_shared_cost, dec!(150));
    assert_eq!(result.items[1].allocated_shared_cost, dec!(50));
}

#[test]
fn test_sub_cent_amounts_are_preserved() {
    let catalog = catalog();
    let mut shipment = two_item_shipment(CalculationMethod::Equal);
    shipment.shared_costs[0].amount = dec!(100.005);
    shipment.shared_costs.push(cost(INSURANCE, dec!(0.004)));

    let result = ShipmentCalculator::new(&catalog).calculate(&shipment).unwrap();
    let summary = &result.calculation_summary;
    assert_eq!(summary.total_shared_costs, dec!(100.009));
    assert_eq!(summary.grand_total_landed_cost, dec!(2100.009));
    assert_eq!(result.shared_costs[1].amount, dec!(0.004));

    let tiny: Vec<Decimal> = result.shared_costs[1]
        .allocations
        .iter()
        .map(|a| a.allocated_amount)
        .collect();
    assert_eq!(tiny, vec![dec!(0.002), dec!(0.002)]);

    let allocated: Decimal = result.items.iter().map(|i| i.allocated_shared_cost).sum();
    assert_eq!(allocated, summary.total_shared_costs);
}

#[test]
fn test_large_quantities_do_not_overflow() {
    let catalog = catalog();
    let mut shipment = two_item_shipment(CalculationMethod::QuantityBased);
    shipment.items[0].quantity = dec!(1000000000000000);
    shipment.items[0].unit_cost = dec!(0.01);
    shipment.shared_costs[0].amount = dec!(100000000000000);

    let result = ShipmentCalculator::new(&catalog).calculate(&shipment).unwrap();
    let allocated: Decimal = result.items.iter().map(|i| i.allocated_shared_cost).sum();
    assert_eq!(allocated, dec!(100000000000000));
}

#[test]
fn test_unknown_category_is_rejected() {
    let catalog = catalog();
    let mut shipment = two_item_shipment(CalculationMethod::Equal);
    shipment.shared_costs.push(cost(99, dec!(10)));

    assert_eq!(
        ShipmentCalculator::new(&catalog).calculate(&shipment).unwrap_err(),
        LandedCostError::UnknownExpenseCategory(ExpenseCategoryId::new(99))
    );
}

#[test]
fn test_override_on_locked_category_is_rejected() {
    let catalog = catalog();
    let mut shipment = two_item_shipment(CalculationMethod::Equal);
    let mut insurance = cost(INSURANCE, dec!(50));
    insurance.manual_allocations = BTreeMap::from([(0, dec!(25)), (1, dec!(25))]);
    shipment.shared_costs.push(insurance);

    assert_eq!(
        ShipmentCalculator::new(&catalog).calculate(&shipment).unwrap_err(),
        LandedCostError::OverrideNotAllowed {
            category: "Insurance".into()
        }
    );
}

#[test]
fn test_custom_epsilon() {
    let catalog = catalog();
    let mut shipment = two_item_shipment(CalculationMethod::Equal);
    shipment.shared_costs[0].manual_allocations =
        BTreeMap::from([(0, dec!(150)), (1, dec!(49.95))]);

    assert!(ShipmentCalculator::new(&catalog).calculate(&shipment).is_err());
    assert!(
        ShipmentCalculator::new(&catalog)
            .with_epsilon(dec!(0.10))
            .calculate(&shipment)
            .is_ok()
    );
}

#[test]
fn test_product_price_updates_skip_ad_hoc_items() {
    let catalog = catalog();
    let mut shipment = two_item_shipment(CalculationMethod::Proportional);
    shipment.items.push(item(None, dec!(1), dec!(0)));

    let result = ShipmentCalculator::new(&catalog).calculate(&shipment).unwrap();
    let updates = result.product_price_updates();
    assert_eq!(updates.len(), 2);
    assert_eq!(updates[0].product_id, ProductId::new(11));
    assert_eq!(updates[0].landed_cost, dec!(110));
    assert_eq!(updates[1].landed_cost, dec!(220));
}

#[test]
fn test_calculation_is_repeatable() {
    let catalog = catalog();
    let shipment = two_item_shipment(CalculationMethod::QuantityBased);
    let calculator = ShipmentCalculator::new(&catalog);
    assert_eq!(
        calculator.calculate(&shipment).unwrap(),
        calculator.calculate(&shipment).unwrap()
    );
}

// =========================================================================
// Properties
// =========================================================================

fn arbitrary_item() -> impl Strategy<Value = ShipmentItem> {
    (1i64..1_000, 0i64..10_000_000, 0i64..100_000).prop_map(|(quantity, cents, grams)| {
        ShipmentItem {
            product_id: None,
            item_name: "generated".into(),
            quantity: Decimal::from(quantity),
            unit_cost: Decimal::new(cents, 2),
            weight: Some(Decimal::new(grams, 3)),
        }
    })
}

fn method_strategy() -> impl Strategy<Value = CalculationMethod> {
    prop_oneof![
        Just(CalculationMethod::Proportional),
        Just(CalculationMethod::Equal),
        Just(CalculationMethod::WeightBased),
        Just(CalculationMethod::QuantityBased),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* valid shipment, the grand total SHALL equal base cost plus
    /// shared costs, and each item's landed cost SHALL equal its base cost
    /// plus its allocation.
    #[test]
    fn prop_totals_are_consistent(
        items in prop::collection::vec(arbitrary_item(), 1..15),
        amounts in prop::collection::vec(0i64..10_000_000, 0..5),
        method in method_strategy(),
    ) {
        let catalog = catalog();
        let shipment = Shipment {
            name: None,
            shipment_date: None,
            calculation_method: method,
            base_currency: CurrencyCode::usd(),
            exchange_rate: Decimal::ONE,
            items,
            shared_costs: amounts.iter().map(|c| cost(INSURANCE, Decimal::new(*c, 2))).collect(),
        };

        let result = ShipmentCalculator::new(&catalog).calculate(&shipment).unwrap();
        let summary = &result.calculation_summary;
        prop_assert_eq!(
            summary.grand_total_landed_cost,
            summary.total_shipment_base_cost + summary.total_shared_costs
        );
        for item in &result.items {
            prop_assert_eq!(
                item.total_landed_cost,
                item.total_item_cost + item.allocated_shared_cost
            );
            prop_assert!(
                item.percentage_share >= Decimal::ZERO && item.percentage_share <= Decimal::ONE
            );
        }
    }

    /// *For any* shipment whose allocation basis is non-degenerate, the
    /// allocated shares SHALL add up to the shared costs exactly.
    #[test]
    fn prop_allocations_conserve_shared_costs(
        items in prop::collection::vec(arbitrary_item(), 1..15),
        amounts in prop::collection::vec(0i64..10_000_000, 1..5),
    ) {
        let catalog = catalog();
        let shipment = Shipment {
            name: None,
            shipment_date: None,
            calculation_method: CalculationMethod::QuantityBased,
            base_currency: CurrencyCode::usd(),
            exchange_rate: Decimal::ONE,
            items,
            shared_costs: amounts.iter().map(|c| cost(FREIGHT, Decimal::new(*c, 2))).collect(),
        };

        let result = ShipmentCalculator::new(&catalog).calculate(&shipment).unwrap();
        let allocated: Decimal = result.items.iter().map(|i| i.allocated_shared_cost).sum();
        prop_assert_eq!(allocated, result.calculation_summary.total_shared_costs);
    }
}
