//! Per-branch quantity effects derived from a movement.

use rust_decimal::Decimal;
use uuid::Uuid;

use super::types::{MovementType, NewMovement};

/// A single change to one branch's stock for one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockEffect {
    /// Add `quantity` to the branch's stock.
    Credit { branch_id: Uuid, quantity: Decimal },
    /// Subtract `quantity` from the branch's stock.
    Debit { branch_id: Uuid, quantity: Decimal },
    /// Set the branch's stock to an absolute `quantity`.
    SetAbsolute { branch_id: Uuid, quantity: Decimal },
}

impl StockEffect {
    /// The branch the effect applies to.
    #[must_use]
    pub const fn branch_id(&self) -> Uuid {
        match self {
            Self::Credit { branch_id, .. }
            | Self::Debit { branch_id, .. }
            | Self::SetAbsolute { branch_id, .. } => *branch_id,
        }
    }
}

/// Derives the branch stock effects of a movement.
///
/// Transfers out touch two branches: a debit at the source and a credit
/// at the receiving branch. All other types touch only the movement's
/// own branch. The caller is responsible for only applying effects when
/// the movement has auto-update enabled.
#[must_use]
pub fn quantity_effects(input: &NewMovement) -> Vec<StockEffect> {
    match input.movement_type {
        MovementType::Arrival | MovementType::TransferIn => vec![StockEffect::Credit {
            branch_id: input.branch_id,
            quantity: input.quantity,
        }],
        MovementType::Dispatch => vec![StockEffect::Debit {
            branch_id: input.branch_id,
            quantity: input.quantity,
        }],
        MovementType::TransferOut => {
            let mut effects = vec![StockEffect::Debit {
                branch_id: input.branch_id,
                quantity: input.quantity,
            }];
            if let Some(reference) = input.reference_branch_id {
                effects.push(StockEffect::Credit {
                    branch_id: reference,
                    quantity: input.quantity,
                });
            }
            effects
        }
        MovementType::Adjustment => vec![StockEffect::SetAbsolute {
            branch_id: input.branch_id,
            quantity: input.quantity,
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn movement(movement_type: MovementType) -> NewMovement {
        NewMovement {
            movement_type,
            product_id: Uuid::new_v4(),
            branch_id: Uuid::new_v4(),
            reference_branch_id: None,
            supplier_id: None,
            quantity: dec!(7),
            unit_price: dec!(3),
            total_amount: None,
            paid_amount: Decimal::ZERO,
            auto_update_product: true,
            description: None,
        }
    }

    #[test]
    fn test_arrival_credits_own_branch() {
        let input = movement(MovementType::Arrival);
        assert_eq!(
            quantity_effects(&input),
            vec![StockEffect::Credit {
                branch_id: input.branch_id,
                quantity: dec!(7),
            }]
        );
    }

    #[test]
    fn test_dispatch_debits_own_branch() {
        let input = movement(MovementType::Dispatch);
        assert_eq!(
            quantity_effects(&input),
            vec![StockEffect::Debit {
                branch_id: input.branch_id,
                quantity: dec!(7),
            }]
        );
    }

    #[test]
    fn test_transfer_out_debits_source_credits_reference() {
        let mut input = movement(MovementType::TransferOut);
        let reference = Uuid::new_v4();
        input.reference_branch_id = Some(reference);

        let effects = quantity_effects(&input);
        assert_eq!(effects.len(), 2);
        assert_eq!(
            effects[0],
            StockEffect::Debit {
                branch_id: input.branch_id,
                quantity: dec!(7),
            }
        );
        assert_eq!(
            effects[1],
            StockEffect::Credit {
                branch_id: reference,
                quantity: dec!(7),
            }
        );
    }

    #[test]
    fn test_adjustment_sets_absolute() {
        let mut input = movement(MovementType::Adjustment);
        input.quantity = dec!(0);
        assert_eq!(
            quantity_effects(&input),
            vec![StockEffect::SetAbsolute {
                branch_id: input.branch_id,
                quantity: dec!(0),
            }]
        );
    }
}
