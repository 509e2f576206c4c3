// Two handler tiers: public (no authentication) and protected (bearer JWT,
// current account injected by middleware).
pub mod protected;
pub mod public;
