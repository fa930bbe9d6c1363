//! Dues calculation for a student.
//!
//! Joins the class fee catalog with the student's sibling and transport
//! status, then nets the result against the payment ledger.

use crate::models::{
    DuesLine, DuesStatement, DuesSummary, FeePayment, FeeStructure, FeeType, Student,
    TransportRoute,
};
use crate::services::Database;
use rust_decimal::Decimal;
use service_core::error::AppError;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// Flat discount applied to tuition line items when the student shares a
/// first guardian with another admitted student.
pub const SIBLING_DISCOUNT_PERCENT: u32 = 10;

#[derive(Clone)]
pub struct DuesCalculator {
    db: Arc<Database>,
}

impl DuesCalculator {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Compute the full dues statement for a student.
    #[instrument(skip(self), fields(school_id = %school_id, student_id = %student_id))]
    pub async fn statement(
        &self,
        school_id: Uuid,
        student_id: Uuid,
    ) -> Result<DuesStatement, AppError> {
        let student = self
            .db
            .get_student(school_id, student_id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Student not found")))?;

        let fees = self
            .db
            .active_fee_structures_for_class(school_id, student.class_id)
            .await?;

        let has_sibling = match student.primary_guardian_id {
            Some(guardian_id) => {
                self.db
                    .has_admitted_sibling(school_id, student.student_id, guardian_id)
                    .await?
            }
            None => false,
        };

        let transport = match student.transport_route_id {
            Some(route_id) => self.db.get_transport_route(school_id, route_id).await?,
            None => None,
        };

        let history = self
            .db
            .payments_for_student(school_id, student.student_id)
            .await?;

        Ok(build_statement(
            &student,
            &fees,
            transport.as_ref(),
            has_sibling,
            history,
        ))
    }
}

fn sibling_discount(amount: Decimal) -> Decimal {
    (amount * Decimal::from(SIBLING_DISCOUNT_PERCENT) / Decimal::ONE_HUNDRED).round_dp(2)
}

/// Assemble a dues statement from already-loaded records.
///
/// The sibling discount applies to tuition lines only; the transport line is
/// synthesized from the route assignment and is never discount-eligible.
pub fn build_statement(
    student: &Student,
    fees: &[FeeStructure],
    transport: Option<&TransportRoute>,
    has_sibling: bool,
    history: Vec<FeePayment>,
) -> DuesStatement {
    let mut breakdown: Vec<DuesLine> = Vec::with_capacity(fees.len() + 1);

    for fee in fees {
        let discount = if has_sibling && FeeType::from_string(&fee.fee_type).discount_eligible() {
            sibling_discount(fee.amount)
        } else {
            Decimal::ZERO
        };

        breakdown.push(DuesLine {
            fee_id: Some(fee.fee_id),
            name: fee.name.clone(),
            fee_type: fee.fee_type.clone(),
            frequency: fee.frequency.clone(),
            amount: fee.amount,
            discount,
            payable: fee.amount - discount,
            due_date: Some(fee.due_date),
        });
    }

    if let Some(route) = transport {
        breakdown.push(DuesLine {
            fee_id: None,
            name: format!("Transport ({})", route.name),
            fee_type: FeeType::Transport.as_str().to_string(),
            frequency: crate::models::FeeFrequency::Monthly.as_str().to_string(),
            amount: route.monthly_cost,
            discount: Decimal::ZERO,
            payable: route.monthly_cost,
            due_date: None,
        });
    }

    let total_fees: Decimal = breakdown.iter().map(|l| l.amount).sum();
    let total_discount: Decimal = breakdown.iter().map(|l| l.discount).sum();
    let net_payable = total_fees - total_discount;
    let total_paid: Decimal = history.iter().map(|p| p.amount_paid).sum();

    let sibling_discount_percent = if has_sibling {
        Decimal::from(SIBLING_DISCOUNT_PERCENT)
    } else {
        Decimal::ZERO
    };

    DuesStatement {
        student_id: student.student_id,
        student_name: student.full_name(),
        class_id: student.class_id,
        breakdown,
        summary: DuesSummary {
            total_fees,
            total_discount,
            net_payable,
            total_paid,
            balance_due: net_payable - total_paid,
            sibling_discount_percent,
        },
        history,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FeeFrequency, PaymentMethod, PaymentStatus, StudentStatus};
    use chrono::{NaiveDate, Utc};

    fn student() -> Student {
        Student {
            student_id: Uuid::new_v4(),
            school_id: Uuid::new_v4(),
            class_id: Uuid::new_v4(),
            admission_no: "ADM-1001".to_string(),
            first_name: "Asha".to_string(),
            last_name: "Verma".to_string(),
            status: StudentStatus::Admitted.as_str().to_string(),
            primary_guardian_id: Some(Uuid::new_v4()),
            transport_route_id: None,
            created_utc: Utc::now(),
            updated_utc: Utc::now(),
        }
    }

    fn fee(name: &str, fee_type: FeeType, amount: i64) -> FeeStructure {
        FeeStructure {
            fee_id: Uuid::new_v4(),
            school_id: Uuid::new_v4(),
            class_id: Uuid::new_v4(),
            name: name.to_string(),
            fee_type: fee_type.as_str().to_string(),
            frequency: FeeFrequency::Annually.as_str().to_string(),
            amount: Decimal::from(amount),
            due_date: NaiveDate::from_ymd_opt(2026, 4, 10).unwrap(),
            is_archived: false,
            created_utc: Utc::now(),
            updated_utc: Utc::now(),
        }
    }

    fn payment(student: &Student, amount: i64, method: PaymentMethod) -> FeePayment {
        FeePayment {
            payment_id: Uuid::new_v4(),
            school_id: student.school_id,
            student_id: student.student_id,
            receipt_number: "RCP-20260401-0001".to_string(),
            amount_paid: Decimal::from(amount),
            payment_date: NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            method: method.as_str().to_string(),
            status: PaymentStatus::Completed.as_str().to_string(),
            remarks: None,
            collected_by: Uuid::new_v4(),
            created_utc: Utc::now(),
        }
    }

    #[test]
    fn no_sibling_no_transport_pays_full_catalog() {
        let s = student();
        let fees = vec![fee("Tuition", FeeType::Tuition, 1000), fee("Exam", FeeType::Exam, 200)];

        let statement = build_statement(&s, &fees, None, false, Vec::new());

        assert_eq!(statement.summary.total_fees, Decimal::from(1200));
        assert_eq!(statement.summary.total_discount, Decimal::ZERO);
        assert_eq!(statement.summary.net_payable, Decimal::from(1200));
        assert_eq!(statement.summary.sibling_discount_percent, Decimal::ZERO);
    }

    #[test]
    fn sibling_discount_hits_tuition_only() {
        let s = student();
        let fees = vec![fee("Tuition", FeeType::Tuition, 1000), fee("Exam", FeeType::Exam, 200)];

        let statement = build_statement(&s, &fees, None, true, Vec::new());

        assert_eq!(statement.summary.total_fees, Decimal::from(1200));
        assert_eq!(statement.summary.total_discount, Decimal::from(100));
        assert_eq!(statement.summary.net_payable, Decimal::from(1100));
        assert_eq!(statement.summary.sibling_discount_percent, Decimal::from(10));

        assert_eq!(statement.breakdown[0].discount, Decimal::from(100));
        assert_eq!(statement.breakdown[1].discount, Decimal::ZERO);
    }

    #[test]
    fn transport_line_is_added_but_never_discounted() {
        let s = student();
        let fees = vec![fee("Tuition", FeeType::Tuition, 1000)];
        let route = TransportRoute {
            route_id: Uuid::new_v4(),
            school_id: s.school_id,
            name: "North Loop".to_string(),
            monthly_cost: Decimal::from(300),
            is_active: true,
            created_utc: Utc::now(),
        };

        let statement = build_statement(&s, &fees, Some(&route), true, Vec::new());

        let transport_line = statement
            .breakdown
            .iter()
            .find(|l| l.fee_type == FeeType::Transport.as_str())
            .expect("transport line present");
        assert_eq!(transport_line.amount, Decimal::from(300));
        assert_eq!(transport_line.discount, Decimal::ZERO);
        assert!(transport_line.fee_id.is_none());

        // 1000 + 300 - 100 tuition discount
        assert_eq!(statement.summary.net_payable, Decimal::from(1200));
    }

    #[test]
    fn balance_nets_payments_and_waivers_against_net_payable() {
        let s = student();
        let fees = vec![fee("Tuition", FeeType::Tuition, 1000), fee("Exam", FeeType::Exam, 200)];
        let history = vec![
            payment(&s, 500, PaymentMethod::Cash),
            payment(&s, 100, PaymentMethod::Waiver),
        ];

        let statement = build_statement(&s, &fees, None, true, history);

        assert_eq!(statement.summary.total_paid, Decimal::from(600));
        assert_eq!(statement.summary.balance_due, Decimal::from(500));
        assert_eq!(
            statement.summary.balance_due,
            statement.summary.net_payable - statement.summary.total_paid
        );
    }

    #[test]
    fn over_payment_surfaces_as_negative_balance() {
        let s = student();
        let fees = vec![fee("Exam", FeeType::Exam, 200)];
        let history = vec![payment(&s, 250, PaymentMethod::Cash)];

        let statement = build_statement(&s, &fees, None, false, history);

        assert_eq!(statement.summary.balance_due, Decimal::from(-50));
    }

    #[test]
    fn fractional_amounts_round_discount_to_two_decimals() {
        let s = student();
        let mut tuition = fee("Tuition", FeeType::Tuition, 0);
        tuition.amount = Decimal::new(99995, 2); // 999.95

        let statement = build_statement(&s, &[tuition], None, true, Vec::new());

        // 10% of 999.95 = 99.995, rounded to 100.00
        assert_eq!(statement.summary.total_discount, Decimal::new(10000, 2));
    }
}
