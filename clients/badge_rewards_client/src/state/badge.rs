use anchor_lang::prelude::*;

#[account]
#[derive(Debug, PartialEq, Eq)]
pub struct Badge {
    pub owner: Pubkey,
    pub badge_id: u64,
    pub name: String,
    pub description: String,
    pub icon_uri: String,
    pub required_points: u64,
    pub max_earnings: u64,
    pub total_earned: u64,
    pub is_active: bool,
    pub bump: u8,
}

impl Badge {
    /// Space the program allocates for a badge account.
    pub const LEN: usize = 918;

    pub fn earnings_exhausted(&self) -> bool {
        self.total_earned >= self.max_earnings
    }
}
