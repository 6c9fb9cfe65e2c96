use crate::{MONEY_GAIN, MONEY_INTERVAL, START_MONEY};
use log::debug;

/// Balance and passive income for one team.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TeamEconomy {
    balance: i32,
    income_timer: f32,
}

impl TeamEconomy {
    pub fn new() -> Self {
        Self {
            balance: START_MONEY,
            income_timer: 0.0,
        }
    }

    pub fn balance(&self) -> i32 {
        self.balance
    }

    /// Overwrites the balance. Negative amounts clamp to zero.
    pub fn set_balance(&mut self, amount: i32) {
        self.balance = amount.max(0);
    }

    pub fn credit(&mut self, amount: i32) {
        if amount < 0 {
            return;
        }
        self.balance += amount;
    }

    /// Spends `amount` if the team can afford it.
    pub fn try_debit(&mut self, amount: i32) -> bool {
        if amount < 0 || self.balance < amount {
            debug!(
                "Cannot spend {}: balance is {}",
                amount, self.balance
            );
            return false;
        }
        self.balance -= amount;
        true
    }

    pub fn can_afford(&self, amount: i32) -> bool {
        amount >= 0 && self.balance >= amount
    }

    /// Accumulates `dt` seconds and pays out one income per full interval.
    pub fn tick(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        self.income_timer += dt;
        while self.income_timer >= MONEY_INTERVAL {
            self.income_timer -= MONEY_INTERVAL;
            self.balance += MONEY_GAIN;
        }
    }
}

impl Default for TeamEconomy {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starting_balance() {
        assert_eq!(TeamEconomy::new().balance(), 200);
    }

    #[test]
    fn test_zero_tick_is_noop() {
        let mut economy = TeamEconomy::new();
        let before = economy;
        economy.tick(0.0);
        economy.tick(-3.0);
        assert_eq!(economy, before);
    }

    #[test]
    fn test_split_interval_pays_once() {
        let mut economy = TeamEconomy::new();
        economy.tick(MONEY_INTERVAL / 2.0);
        assert_eq!(economy.balance(), 200);
        economy.tick(MONEY_INTERVAL / 2.0);
        assert_eq!(economy.balance(), 200 + MONEY_GAIN);
    }

    #[test]
    fn test_large_dt_pays_every_interval() {
        let mut economy = TeamEconomy::new();
        economy.tick(MONEY_INTERVAL * 3.0 + 1.0);
        assert_eq!(economy.balance(), 200 + 3 * MONEY_GAIN);
    }

    #[test]
    fn test_debit() {
        let mut economy = TeamEconomy::new();
        assert!(!economy.try_debit(400));
        assert_eq!(economy.balance(), 200);
        assert!(economy.try_debit(200));
        assert_eq!(economy.balance(), 0);
        assert!(!economy.try_debit(-5));
    }

    #[test]
    fn test_set_balance_clamps() {
        let mut economy = TeamEconomy::new();
        economy.set_balance(-10);
        assert_eq!(economy.balance(), 0);
        economy.credit(-10);
        assert_eq!(economy.balance(), 0);
        economy.credit(75);
        assert_eq!(economy.balance(), 75);
    }
}
