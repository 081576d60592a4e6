//! 淨需求計算

use replen_core::{DemandRecord, StockRecord};

/// 淨需求計算結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetRequirement {
    /// 物料ID
    pub item_id: String,
    /// 總需求
    pub gross_requirement: u64,
    /// 淨可用庫存（可用 - 保留）
    pub net_available: i128,
    /// 安全庫存
    pub safety_stock: u64,
    /// 淨需求
    pub net_requirement: u64,
}

/// 淨需求計算器
pub struct NetDemandCalculator;

impl NetDemandCalculator {
    /// 淨需求 = max(0, 需求 + 安全庫存 - (可用庫存 - 保留庫存))
    ///
    /// 安全庫存視為額外需求；保留庫存已被承諾，從可用量中扣除。
    /// 以 `i128` 計算，所有 `u64` 輸入皆不會溢位。
    pub fn net_demand(
        total_demand: u64,
        available_stock: u64,
        reserved_stock: u64,
        safety_stock: u64,
    ) -> u64 {
        let net_available = i128::from(available_stock) - i128::from(reserved_stock);
        let net = i128::from(total_demand) + i128::from(safety_stock) - net_available;
        u64::try_from(net.max(0)).unwrap_or(u64::MAX)
    }

    /// 計算單一物料的淨需求
    pub fn calculate(demand: &DemandRecord, stock: &StockRecord) -> NetRequirement {
        NetRequirement {
            item_id: demand.item_id.clone(),
            gross_requirement: demand.total_demand,
            net_available: stock.net_available(),
            safety_stock: stock.safety_stock,
            net_requirement: Self::net_demand(
                demand.total_demand,
                stock.available_stock,
                stock.reserved_stock,
                stock.safety_stock,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    // 需求 55 + 安全 10 - 可用 70 = -5 → 0
    #[case(55, 70, 0, 10, 0)]
    // 需求 52 + 安全 10 - 可用 40 = 22
    #[case(52, 40, 0, 10, 22)]
    // 保留量從可用量扣除：52 + 10 - (40 - 15) = 37
    #[case(52, 40, 15, 10, 37)]
    // 保留量大於可用量：5 + 0 - (10 - 30) = 25
    #[case(5, 10, 30, 0, 25)]
    #[case(0, 0, 0, 0, 0)]
    #[case(0, 0, 0, 10, 10)]
    fn test_net_demand(
        #[case] demand: u64,
        #[case] available: u64,
        #[case] reserved: u64,
        #[case] safety: u64,
        #[case] expected: u64,
    ) {
        assert_eq!(
            NetDemandCalculator::net_demand(demand, available, reserved, safety),
            expected
        );
    }

    #[test]
    fn test_net_demand_saturates() {
        assert_eq!(
            NetDemandCalculator::net_demand(u64::MAX, 0, u64::MAX, u64::MAX),
            u64::MAX
        );
        assert_eq!(NetDemandCalculator::net_demand(0, u64::MAX, 0, 0), 0);
    }

    #[test]
    fn test_calculate_from_records() {
        let demand = DemandRecord::new("SKU000001".to_string(), 52, 7);
        let stock = StockRecord::new("SKU000001".to_string(), 40, 0, 10);

        let requirement = NetDemandCalculator::calculate(&demand, &stock);

        assert_eq!(requirement.gross_requirement, 52);
        assert_eq!(requirement.net_available, 40);
        assert_eq!(requirement.net_requirement, 22);
    }

    proptest! {
        #[test]
        fn prop_matches_formula(
            demand in 0u64..1_000_000,
            available in 0u64..1_000_000,
            reserved in 0u64..1_000_000,
            safety in 0u64..1_000_000,
        ) {
            let expected = (demand as i64 + safety as i64 - (available as i64 - reserved as i64)).max(0) as u64;
            prop_assert_eq!(
                NetDemandCalculator::net_demand(demand, available, reserved, safety),
                expected
            );
        }

        #[test]
        fn prop_more_stock_never_increases_net(
            demand in 0u64..10_000,
            available in 0u64..10_000,
            extra in 0u64..10_000,
            safety in 0u64..1_000,
        ) {
            let base = NetDemandCalculator::net_demand(demand, available, 0, safety);
            let more = NetDemandCalculator::net_demand(demand, available + extra, 0, safety);
            prop_assert!(more <= base);
        }
    }
}
