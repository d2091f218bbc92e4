use anchor_lang::prelude::*;

#[account]
#[derive(Debug, PartialEq, Eq)]
pub struct UserReward {
    pub user: Pubkey,
    pub reward_id: u64,
    pub claimed_at: i64,
    pub bump: u8,
}

impl UserReward {
    /// Byte offset of `user`, after the account discriminator.
    pub const USER_OFFSET: usize = 8;
}
