use rand::SeedableRng;
use rand_chacha::ChaChaRng;

use accounts::{
    Account, AccountError, AccountRegistry, AccountType, NetworkId, Transaction,
    TransactionFlags, VestingCreationData,
};
use primitives::PublicKey;
use wallet::{KeyPair, MultiSigWallet, Wallet, WalletError};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn key_pair(seed: u8) -> KeyPair {
    KeyPair::generate(&mut ChaChaRng::from_seed([seed; 32]))
}

struct Participants {
    wallets: Vec<MultiSigWallet>,
    keys: Vec<PublicKey>,
}

fn participants(min_signatures: usize, n: u8) -> Participants {
    let pairs: Vec<_> = (1..=n).map(key_pair).collect();
    let keys: Vec<_> = pairs.iter().map(|kp| *kp.public_key()).collect();
    let wallets = pairs
        .into_iter()
        .map(|kp| MultiSigWallet::from_public_keys(kp, min_signatures, &keys).unwrap())
        .collect();
    Participants { wallets, keys }
}

/// Runs both signing rounds among `signers` (indices into the participants).
fn sign_jointly(
    participants: &Participants,
    signers: &[usize],
    transaction: Transaction,
    rng: &mut ChaChaRng,
) -> Result<Transaction, WalletError> {
    let signer_keys: Vec<_> = signers.iter().map(|&i| participants.keys[i]).collect();
    let aggregate_key = musig::aggregate_public_keys(&signer_keys)?;

    let commitments: Vec<_> = signers
        .iter()
        .map(|&i| participants.wallets[i].create_commitment(rng))
        .collect();
    let aggregate_commitment = musig::aggregate_commitments(
        &commitments.iter().map(|c| c.commitment()).collect::<Vec<_>>(),
    )?;

    let shares = signers
        .iter()
        .zip(commitments.iter())
        .map(|(&i, c)| {
            participants.wallets[i].partially_sign_transaction(
                &transaction,
                &signer_keys,
                &aggregate_commitment,
                c.secret(),
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    participants.wallets[signers[0]].complete_transaction(
        transaction,
        &aggregate_key,
        &aggregate_commitment,
        &shares,
    )
}

#[test]
fn any_two_of_three_can_spend() {
    init_logger();
    let registry = AccountRegistry::default();
    let policy = registry.policy().clone();
    let group = participants(2, 3);
    let address = *group.wallets[0].address();
    let recipient = key_pair(7).address();
    let mut rng = ChaChaRng::from_seed([1u8; 32]);

    let funded = Account::initial().with_balance(10_000).unwrap();

    for signers in &[[0, 1], [0, 2], [1, 2], [2, 0]] {
        let unsigned = group.wallets[signers[0]]
            .create_transaction(recipient, 1_000, 10, 100, NetworkId::MAIN)
            .unwrap();
        assert_eq!(unsigned.sender(), &address);
        assert!(!unsigned.verify(NetworkId::MAIN, &registry));

        let signed = sign_jointly(&group, signers, unsigned, &mut rng).unwrap();
        assert!(signed.verify(NetworkId::MAIN, &registry));
        assert!(!signed.verify(NetworkId::TEST, &registry));

        let sender = funded
            .with_outgoing_transaction(&signed, 150, false, &policy)
            .unwrap();
        assert_eq!(sender.balance(), 8_990);
        let reverted = sender
            .with_outgoing_transaction(&signed, 150, true, &policy)
            .unwrap();
        assert_eq!(reverted, funded);

        let receiver = Account::initial()
            .with_incoming_transaction(&signed, 150, false)
            .unwrap();
        assert_eq!(receiver.balance(), 1_000);
    }
}

#[test]
fn three_of_three_needs_everyone() {
    init_logger();
    let registry = AccountRegistry::default();
    let group = participants(3, 3);
    let recipient = key_pair(7).address();
    let mut rng = ChaChaRng::from_seed([2u8; 32]);

    let tx = group.wallets[2]
        .create_transaction(recipient, 5, 0, 1, NetworkId::TEST)
        .unwrap();
    let signed = sign_jointly(&group, &[2, 0, 1], tx.clone(), &mut rng).unwrap();
    assert!(signed.verify(NetworkId::TEST, &registry));

    assert_eq!(
        sign_jointly(&group, &[0, 1], tx, &mut rng).unwrap_err(),
        WalletError::WrongNumberOfPartialSignatures {
            expected: 3,
            actual: 2
        }
    );
}

#[test]
fn mismatched_commitment_is_rejected() {
    init_logger();
    let group = participants(2, 3);
    let recipient = key_pair(7).address();
    let mut rng = ChaChaRng::from_seed([3u8; 32]);

    let tx = group.wallets[0]
        .create_transaction(recipient, 5, 0, 1, NetworkId::MAIN)
        .unwrap();
    let signer_keys = [group.keys[0], group.keys[1]];
    let aggregate_key = musig::aggregate_public_keys(&signer_keys).unwrap();

    let c0 = group.wallets[0].create_commitment(&mut rng);
    let c1 = group.wallets[1].create_commitment(&mut rng);
    let aggregate_commitment =
        musig::aggregate_commitments(&[c0.commitment(), c1.commitment()]).unwrap();

    let share0 = group.wallets[0]
        .partially_sign_transaction(&tx, &signer_keys, &aggregate_commitment, c0.secret())
        .unwrap();
    // The second signer only saw its own commitment.
    let share1 = group.wallets[1]
        .partially_sign_transaction(&tx, &signer_keys, &c1.commitment(), c1.secret())
        .unwrap();

    assert_eq!(
        group.wallets[0]
            .sign_transaction(&tx, &aggregate_key, &aggregate_commitment, &[share0, share1])
            .unwrap_err(),
        WalletError::InvalidSignature
    );
}

#[test]
fn wallet_pays_into_and_out_of_vesting_contract() {
    init_logger();
    let registry = AccountRegistry::default();
    let policy = registry.policy().clone();
    let creator = Wallet::new(key_pair(1));
    let owner = Wallet::new(key_pair(2));

    let data = VestingCreationData {
        owner: *owner.address(),
        vesting_start: 0,
        vesting_step_blocks: 10,
        vesting_step_amount: Some(100),
        vesting_total_amount: Some(1000),
    }
    .to_bytes()
    .unwrap();
    let mut creation = Transaction::new_contract_creation(
        *creator.address(),
        AccountType::BASIC,
        AccountType::VESTING,
        1000,
        0,
        1,
        data,
        Vec::new(),
        NetworkId::MAIN,
    )
    .unwrap();
    let proof = creator.sign_transaction(&creation);
    creation.set_signature_proof(&proof).unwrap();
    assert!(creation.has_flag(TransactionFlags::CONTRACT_CREATION));
    assert!(creation.verify(NetworkId::MAIN, &registry));

    let contract = Account::initial()
        .with_incoming_transaction(&creation, 1, false)
        .unwrap()
        .with_contract_command(&creation, 1, false, &registry)
        .unwrap();
    assert_eq!(contract.account_type(), AccountType::VESTING);
    assert_eq!(contract.balance(), 1000);

    let withdraw = |value: u64, signer: &Wallet| {
        let mut tx = Transaction::new_extended(
            *creation.recipient(),
            AccountType::VESTING,
            *owner.address(),
            AccountType::BASIC,
            value,
            0,
            45,
            TransactionFlags::empty(),
            Vec::new(),
            Vec::new(),
            NetworkId::MAIN,
        )
        .unwrap();
        let proof = signer.sign_transaction(&tx);
        tx.set_signature_proof(&proof).unwrap();
        tx
    };

    // Half of the funds are vested at height 50.
    let allowed = withdraw(500, &owner);
    assert!(allowed.verify(NetworkId::MAIN, &registry));
    let remaining = contract
        .with_outgoing_transaction(&allowed, 50, false, &policy)
        .unwrap();
    assert_eq!(remaining.balance(), 500);

    assert_eq!(
        contract
            .with_outgoing_transaction(&withdraw(501, &owner), 50, false, &policy)
            .unwrap_err(),
        AccountError::BalanceError
    );

    // Signed by the creator, not the owner.
    let foreign = withdraw(100, &creator);
    assert!(foreign.verify(NetworkId::MAIN, &registry));
    assert!(contract
        .with_outgoing_transaction(&foreign, 50, false, &policy)
        .is_err());
}
