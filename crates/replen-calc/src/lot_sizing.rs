//! 訂購數量取整

use replen_core::MoqPolicy;

/// 訂購數量取整器
#[derive(Debug, Clone, Copy)]
pub struct OrderQuantityRounder {
    policy: MoqPolicy,
}

impl OrderQuantityRounder {
    pub fn new(policy: MoqPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> MoqPolicy {
        self.policy
    }

    /// 需要的包裝數 = ceil(淨需求 / 包裝數量)
    ///
    /// 包裝數量小於 1 時以 1 計算。
    pub fn packs_needed(net_demand: u64, pack_size: u64) -> u64 {
        net_demand.div_ceil(pack_size.max(1))
    }

    /// 將淨需求轉換為可採購的訂購數量
    ///
    /// 淨需求為 0 時回傳 `None`（不產生訂單）。先向上取整到包裝倍數，
    /// 再以最小訂購量為下限。在 [`MoqPolicy::AfterPackRounding`] 下，
    /// 由最小訂購量決定的結果可能不是包裝倍數。
    pub fn round(&self, net_demand: u64, pack_size: u64, min_order_quantity: u64) -> Option<u64> {
        if net_demand == 0 {
            return None;
        }

        let pack_size = pack_size.max(1);
        let quantity = Self::packs_needed(net_demand, pack_size).saturating_mul(pack_size);

        if quantity >= min_order_quantity {
            return Some(quantity);
        }

        let floor = match self.policy {
            MoqPolicy::AfterPackRounding => min_order_quantity,
            MoqPolicy::AlignedToPack => min_order_quantity
                .div_ceil(pack_size)
                .saturating_mul(pack_size),
        };
        Some(floor)
    }
}

impl Default for OrderQuantityRounder {
    fn default() -> Self {
        Self::new(MoqPolicy::AfterPackRounding)
    }
}
