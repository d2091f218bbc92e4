use anchor_lang::prelude::*;

#[account]
#[derive(Debug, PartialEq, Eq)]
pub struct UserBadge {
    pub user: Pubkey,
    pub badge_id: u64,
    pub earned_at: i64,
    pub bump: u8,
}

impl UserBadge {
    /// Byte offset of `user`, after the account discriminator.
    pub const USER_OFFSET: usize = 8;
}
