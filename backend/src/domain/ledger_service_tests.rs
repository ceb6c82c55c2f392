use std::sync::Arc;

use bigdecimal::BigDecimal;
use rstest::{fixture, rstest};
use uuid::Uuid;

use super::*;
use crate::domain::investment::{ProjectFunding, ProjectStatus};
use crate::domain::memory_store::InMemoryLedgerStore;
use crate::domain::principal::Role;
use crate::domain::transaction::{Decision, PaymentMethod, TransactionKind, TransactionStatus};
use crate::domain::ErrorCode;

type Service = LedgerService<InMemoryLedgerStore>;

#[fixture]
fn store() -> Arc<InMemoryLedgerStore> {
    Arc::new(InMemoryLedgerStore::new())
}

fn service(store: &Arc<InMemoryLedgerStore>) -> Service {
    LedgerService::new(Arc::clone(store))
}

fn investor() -> Principal {
    Principal::new(UserId::from_uuid(Uuid::new_v4()), Role::Investor)
}

fn escrow_manager() -> Principal {
    Principal::new(UserId::from_uuid(Uuid::new_v4()), Role::EscrowManager)
}

fn deposit_request(user_id: UserId, amount: i64) -> DepositRequest {
    DepositRequest {
        user_id,
        amount: BigDecimal::from(amount),
        method: PaymentMethod::BankTransfer,
    }
}

fn withdrawal_request(user_id: UserId, amount: i64) -> WithdrawalRequest {
    WithdrawalRequest {
        user_id,
        amount: BigDecimal::from(amount),
        method: PaymentMethod::MobileMoney,
        account_details: "0712 000 111".to_owned(),
    }
}

fn seeking_project(store: &InMemoryLedgerStore, goal: i64) -> Uuid {
    let project_id = Uuid::new_v4();
    store.seed_project(ProjectFunding {
        project_id,
        funding_goal: BigDecimal::from(goal),
        current_funding: BigDecimal::from(0),
        status: ProjectStatus::SeekingFunding,
    });
    project_id
}

#[rstest]
#[tokio::test]
async fn first_wallet_read_creates_an_empty_wallet(store: Arc<InMemoryLedgerStore>) {
    let svc = service(&store);
    let user = UserId::from_uuid(Uuid::new_v4());

    let wallet = svc.balance(user).await.expect("wallet");
    assert_eq!(*wallet.balance(), BigDecimal::from(0));

    // Idempotent: a second read returns the same wallet.
    let again = svc.balance(user).await.expect("wallet");
    assert_eq!(again.id(), wallet.id());
}

#[rstest]
#[tokio::test]
async fn deposit_is_pending_and_does_not_credit(store: Arc<InMemoryLedgerStore>) {
    let svc = service(&store);
    let user = UserId::from_uuid(Uuid::new_v4());

    let txn = svc
        .create_deposit(deposit_request(user, 2000))
        .await
        .expect("deposit");
    assert_eq!(txn.kind, TransactionKind::Deposit);
    assert_eq!(txn.status, TransactionStatus::Pending);
    assert_eq!(txn.notes.as_deref(), Some("Deposit request via bank_transfer"));

    let wallet = svc.balance(user).await.expect("wallet");
    assert_eq!(*wallet.balance(), BigDecimal::from(0));
}

#[rstest]
#[case(0)]
#[case(-50)]
#[tokio::test]
async fn non_positive_deposit_amounts_are_rejected(
    store: Arc<InMemoryLedgerStore>,
    #[case] amount: i64,
) {
    let svc = service(&store);
    let err = svc
        .create_deposit(deposit_request(UserId::from_uuid(Uuid::new_v4()), amount))
        .await
        .expect_err("invalid amount");
    assert_eq!(err.code(), ErrorCode::InvalidAmount);
}

#[rstest]
#[tokio::test]
async fn approved_deposit_credits_the_wallet(store: Arc<InMemoryLedgerStore>) {
    let svc = service(&store);
    let user = UserId::from_uuid(Uuid::new_v4());
    let admin = escrow_manager();

    let txn = svc
        .create_deposit(deposit_request(user, 2000))
        .await
        .expect("deposit");
    let decided = svc
        .decide(
            admin,
            DecisionRequest {
                transaction_id: txn.id,
                decision: Decision::Approve,
                notes: Some("bank statement matches".to_owned()),
            },
        )
        .await
        .expect("decision");

    assert_eq!(decided.status, TransactionStatus::Completed);
    assert_eq!(decided.processed_by, Some(admin.id));
    assert!(decided.processed_at.is_some());

    let wallet = svc.balance(user).await.expect("wallet");
    assert_eq!(*wallet.balance(), BigDecimal::from(2000));
}

#[rstest]
#[tokio::test]
async fn rejected_deposit_leaves_the_wallet_untouched(store: Arc<InMemoryLedgerStore>) {
    let svc = service(&store);
    let user = UserId::from_uuid(Uuid::new_v4());

    let txn = svc
        .create_deposit(deposit_request(user, 750))
        .await
        .expect("deposit");
    svc.decide(
        escrow_manager(),
        DecisionRequest {
            transaction_id: txn.id,
            decision: Decision::Reject,
            notes: None,
        },
    )
    .await
    .expect("decision");

    let wallet = svc.balance(user).await.expect("wallet");
    assert_eq!(*wallet.balance(), BigDecimal::from(0));
}

#[rstest]
#[tokio::test]
async fn proof_moves_a_pending_deposit_to_verifying(store: Arc<InMemoryLedgerStore>) {
    let svc = service(&store);
    let user = UserId::from_uuid(Uuid::new_v4());

    let txn = svc
        .create_deposit(deposit_request(user, 300))
        .await
        .expect("deposit");
    let updated = svc
        .attach_proof(ProofRequest {
            user_id: user,
            transaction_id: txn.id,
            proof_reference: "blob://receipts/ab12".to_owned(),
        })
        .await
        .expect("proof");

    assert_eq!(updated.status, TransactionStatus::Verifying);
    assert_eq!(updated.proof_of_payment.as_deref(), Some("blob://receipts/ab12"));
}

#[rstest]
#[tokio::test]
async fn proof_requires_a_non_empty_reference(store: Arc<InMemoryLedgerStore>) {
    let svc = service(&store);
    let err = svc
        .attach_proof(ProofRequest {
            user_id: UserId::from_uuid(Uuid::new_v4()),
            transaction_id: Uuid::new_v4(),
            proof_reference: "   ".to_owned(),
        })
        .await
        .expect_err("blank proof");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn proof_on_another_users_transaction_is_not_found(store: Arc<InMemoryLedgerStore>) {
    let svc = service(&store);
    let owner = UserId::from_uuid(Uuid::new_v4());
    let stranger = UserId::from_uuid(Uuid::new_v4());

    let txn = svc
        .create_deposit(deposit_request(owner, 300))
        .await
        .expect("deposit");
    let err = svc
        .attach_proof(ProofRequest {
            user_id: stranger,
            transaction_id: txn.id,
            proof_reference: "blob://receipts/cd34".to_owned(),
        })
        .await
        .expect_err("not the owner");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn withdrawal_reserves_funds_immediately(store: Arc<InMemoryLedgerStore>) {
    let svc = service(&store);
    let user = UserId::from_uuid(Uuid::new_v4());
    store.seed_wallet(user, BigDecimal::from(5000));

    let txn = svc
        .create_withdrawal(withdrawal_request(user, 500))
        .await
        .expect("withdrawal");
    assert_eq!(txn.kind, TransactionKind::Withdrawal);
    assert_eq!(txn.status, TransactionStatus::Pending);
    assert_eq!(
        txn.notes.as_deref(),
        Some("Withdrawal request via mobile_money: 0712 000 111")
    );

    let wallet = svc.balance(user).await.expect("wallet");
    assert_eq!(*wallet.balance(), BigDecimal::from(4500));
}

#[rstest]
#[tokio::test]
async fn rejected_withdrawal_refunds_the_reservation(store: Arc<InMemoryLedgerStore>) {
    let svc = service(&store);
    let user = UserId::from_uuid(Uuid::new_v4());
    store.seed_wallet(user, BigDecimal::from(5000));

    let txn = svc
        .create_withdrawal(withdrawal_request(user, 500))
        .await
        .expect("withdrawal");
    svc.decide(
        escrow_manager(),
        DecisionRequest {
            transaction_id: txn.id,
            decision: Decision::Reject,
            notes: Some("payout account mismatch".to_owned()),
        },
    )
    .await
    .expect("decision");

    let wallet = svc.balance(user).await.expect("wallet");
    assert_eq!(*wallet.balance(), BigDecimal::from(5000));
}

#[rstest]
#[tokio::test]
async fn approved_withdrawal_does_not_refund(store: Arc<InMemoryLedgerStore>) {
    let svc = service(&store);
    let user = UserId::from_uuid(Uuid::new_v4());
    store.seed_wallet(user, BigDecimal::from(5000));

    let txn = svc
        .create_withdrawal(withdrawal_request(user, 500))
        .await
        .expect("withdrawal");
    svc.decide(
        escrow_manager(),
        DecisionRequest {
            transaction_id: txn.id,
            decision: Decision::Approve,
            notes: None,
        },
    )
    .await
    .expect("decision");

    let wallet = svc.balance(user).await.expect("wallet");
    assert_eq!(*wallet.balance(), BigDecimal::from(4500));
}

#[rstest]
#[tokio::test]
async fn withdrawal_beyond_balance_is_rejected(store: Arc<InMemoryLedgerStore>) {
    let svc = service(&store);
    let user = UserId::from_uuid(Uuid::new_v4());
    store.seed_wallet(user, BigDecimal::from(100));

    let err = svc
        .create_withdrawal(withdrawal_request(user, 101))
        .await
        .expect_err("insufficient");
    assert_eq!(err.code(), ErrorCode::InsufficientFunds);

    let wallet = svc.balance(user).await.expect("wallet");
    assert_eq!(*wallet.balance(), BigDecimal::from(100));
}

#[rstest]
#[tokio::test]
async fn deciding_a_settled_transaction_is_an_invalid_state(store: Arc<InMemoryLedgerStore>) {
    let svc = service(&store);
    let user = UserId::from_uuid(Uuid::new_v4());
    let admin = escrow_manager();

    let txn = svc
        .create_deposit(deposit_request(user, 2000))
        .await
        .expect("deposit");
    let request = DecisionRequest {
        transaction_id: txn.id,
        decision: Decision::Approve,
        notes: None,
    };
    svc.decide(admin, request.clone()).await.expect("first decision");

    let err = svc.decide(admin, request).await.expect_err("second decision");
    assert_eq!(err.code(), ErrorCode::InvalidState);

    // The second approval must not credit the wallet again.
    let wallet = svc.balance(user).await.expect("wallet");
    assert_eq!(*wallet.balance(), BigDecimal::from(2000));
}

#[rstest]
#[case(Role::Investor)]
#[case(Role::Innovator)]
#[tokio::test]
async fn escrow_workflow_rejects_non_escrow_roles(
    store: Arc<InMemoryLedgerStore>,
    #[case] role: Role,
) {
    let svc = service(&store);
    let principal = Principal::new(UserId::from_uuid(Uuid::new_v4()), role);

    let err = svc
        .pending_transactions(principal)
        .await
        .expect_err("forbidden");
    assert_eq!(err.code(), ErrorCode::Forbidden);

    let err = svc
        .decide(
            principal,
            DecisionRequest {
                transaction_id: Uuid::new_v4(),
                decision: Decision::Approve,
                notes: None,
            },
        )
        .await
        .expect_err("forbidden");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn pending_listing_includes_owners_and_excludes_settled(store: Arc<InMemoryLedgerStore>) {
    let svc = service(&store);
    let alice = UserId::from_uuid(Uuid::new_v4());
    let bob = UserId::from_uuid(Uuid::new_v4());
    let admin = escrow_manager();

    let settled = svc
        .create_deposit(deposit_request(alice, 100))
        .await
        .expect("deposit");
    svc.decide(
        admin,
        DecisionRequest {
            transaction_id: settled.id,
            decision: Decision::Reject,
            notes: None,
        },
    )
    .await
    .expect("decision");
    let open = svc
        .create_deposit(deposit_request(bob, 200))
        .await
        .expect("deposit");

    let pending = svc.pending_transactions(admin).await.expect("listing");
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].transaction.id, open.id);
    assert_eq!(pending[0].user_id, bob);
}

#[rstest]
#[tokio::test]
async fn investment_debits_wallet_and_advances_funding(store: Arc<InMemoryLedgerStore>) {
    let svc = service(&store);
    let caller = investor();
    store.seed_wallet(caller.id, BigDecimal::from(10_000));
    let project_id = seeking_project(&store, 50_000);

    let receipt = svc
        .invest(InvestRequest {
            investor_id: caller.id,
            project_id,
            amount: BigDecimal::from(1000),
        })
        .await
        .expect("investment");

    assert_eq!(receipt.investment.amount, BigDecimal::from(1000));
    assert_eq!(receipt.funding.current_funding, BigDecimal::from(1000));
    assert_eq!(receipt.funding.status, ProjectStatus::PartiallyFunded);

    let wallet = svc.balance(caller.id).await.expect("wallet");
    assert_eq!(*wallet.balance(), BigDecimal::from(9000));
}

#[rstest]
#[tokio::test]
async fn investment_reaching_goal_closes_the_project(store: Arc<InMemoryLedgerStore>) {
    let svc = service(&store);
    let caller = investor();
    store.seed_wallet(caller.id, BigDecimal::from(60_000));
    let project_id = Uuid::new_v4();
    store.seed_project(ProjectFunding {
        project_id,
        funding_goal: BigDecimal::from(50_000),
        current_funding: BigDecimal::from(49_000),
        status: ProjectStatus::PartiallyFunded,
    });

    let receipt = svc
        .invest(InvestRequest {
            investor_id: caller.id,
            project_id,
            amount: BigDecimal::from(1000),
        })
        .await
        .expect("investment");
    assert_eq!(receipt.funding.status, ProjectStatus::FullyFunded);

    // The project no longer accepts investments.
    let err = svc
        .invest(InvestRequest {
            investor_id: caller.id,
            project_id,
            amount: BigDecimal::from(1),
        })
        .await
        .expect_err("closed project");
    assert_eq!(err.code(), ErrorCode::ProjectNotFundable);
}

#[rstest]
#[tokio::test]
async fn investment_without_funds_leaves_no_trace(store: Arc<InMemoryLedgerStore>) {
    let svc = service(&store);
    let caller = investor();
    store.seed_wallet(caller.id, BigDecimal::from(100));
    let project_id = seeking_project(&store, 50_000);

    let err = svc
        .invest(InvestRequest {
            investor_id: caller.id,
            project_id,
            amount: BigDecimal::from(1000),
        })
        .await
        .expect_err("insufficient");
    assert_eq!(err.code(), ErrorCode::InsufficientFunds);

    assert!(svc.investments(caller.id).await.expect("listing").is_empty());
    let wallet = svc.balance(caller.id).await.expect("wallet");
    assert_eq!(*wallet.balance(), BigDecimal::from(100));
}

#[rstest]
#[tokio::test]
async fn investor_without_a_wallet_has_insufficient_funds(store: Arc<InMemoryLedgerStore>) {
    let svc = service(&store);
    let project_id = seeking_project(&store, 50_000);

    let err = svc
        .invest(InvestRequest {
            investor_id: UserId::from_uuid(Uuid::new_v4()),
            project_id,
            amount: BigDecimal::from(10),
        })
        .await
        .expect_err("no wallet");
    assert_eq!(err.code(), ErrorCode::InsufficientFunds);
}

#[rstest]
#[tokio::test]
async fn investment_in_an_unknown_project_is_not_found(store: Arc<InMemoryLedgerStore>) {
    let svc = service(&store);
    let caller = investor();
    store.seed_wallet(caller.id, BigDecimal::from(1000));

    let err = svc
        .invest(InvestRequest {
            investor_id: caller.id,
            project_id: Uuid::new_v4(),
            amount: BigDecimal::from(10),
        })
        .await
        .expect_err("unknown project");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn failed_investment_commit_rolls_back_every_write(store: Arc<InMemoryLedgerStore>) {
    let svc = service(&store);
    let caller = investor();
    store.seed_wallet(caller.id, BigDecimal::from(10_000));
    let project_id = seeking_project(&store, 50_000);

    store.fail_next_investment();
    let err = svc
        .invest(InvestRequest {
            investor_id: caller.id,
            project_id,
            amount: BigDecimal::from(1000),
        })
        .await
        .expect_err("injected failure");
    assert_eq!(err.code(), ErrorCode::InternalError);

    // No partial effect: wallet, funding, and listing are all untouched.
    let wallet = svc.balance(caller.id).await.expect("wallet");
    assert_eq!(*wallet.balance(), BigDecimal::from(10_000));
    assert!(svc.investments(caller.id).await.expect("listing").is_empty());

    let retry = svc
        .invest(InvestRequest {
            investor_id: caller.id,
            project_id,
            amount: BigDecimal::from(1000),
        })
        .await
        .expect("retry succeeds");
    assert_eq!(retry.funding.current_funding, BigDecimal::from(1000));
}

#[rstest]
#[tokio::test]
async fn concurrent_investments_never_overspend(store: Arc<InMemoryLedgerStore>) {
    let svc = service(&store);
    let caller = investor();
    store.seed_wallet(caller.id, BigDecimal::from(1000));
    let project_id = seeking_project(&store, 50_000);

    let request = InvestRequest {
        investor_id: caller.id,
        project_id,
        amount: BigDecimal::from(800),
    };
    let (first, second) = tokio::join!(svc.invest(request.clone()), svc.invest(request.clone()));

    let successes = [&first, &second].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one of the two debits may win");

    let wallet = svc.balance(caller.id).await.expect("wallet");
    assert_eq!(*wallet.balance(), BigDecimal::from(200));
}
