// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Dispatcher tests against spy collaborators

mod spies;

use alloy_primitives::U256;
use api_client::{
    AssetTransfer, ContractOwner, FeeData, RawContract, TokenBalance, TransferMetadata,
    TransferPage,
};
use blockchain_service::{Direction, Holding, PortfolioRequest, TransactionStatus};
use shared_types::ErrorCode;
use spies::*;

const ONE_AND_A_HALF_ETH: u128 = 1_500_000_000_000_000_000;

fn eth_transfer(hash: &str, block: u64) -> AssetTransfer {
    AssetTransfer {
        block_num: format!("{block:#x}"),
        hash: hash.to_string(),
        from: VITALIK.to_lowercase(),
        to: Some("0x0000000000000000000000000000000000000001".to_string()),
        asset: Some("ETH".to_string()),
        category: "external".to_string(),
        token_id: None,
        raw_contract: RawContract {
            value: Some("0xde0b6b3a7640000".to_string()),
            address: None,
            decimal: Some("0x12".to_string()),
        },
        metadata: Some(TransferMetadata {
            block_timestamp: Some("2024-03-01T12:00:00.000Z".to_string()),
        }),
    }
}

/// Test that a Bitcoin balance is answered by the ledger alone
#[tokio::test]
async fn bitcoin_balance_hits_ledger() {
    let harness = Harness::new(
        SpyEvm::default(),
        SpyLedger {
            funded: 80_000_000,
            spent: 30_000_000,
            ..SpyLedger::default()
        },
        SpyFeed::default(),
    );

    let response = harness.service.get_balance(SATOSHI, "bitcoin").await;

    assert!(response.is_success(), "{response:?}");
    let balance = response.into_data().unwrap();
    assert_eq!(balance.balance, "0.5");
    assert_eq!(balance.raw_balance, "50000000");
    assert_eq!(balance.decimals, 8);
    assert_eq!(balance.symbol.as_deref(), Some("BTC"));
    assert_eq!(harness.ledger.calls(), 1);
    assert_eq!(harness.evm.calls(), 0);
}

/// Test that the `btc` alias routes to the ledger too
#[tokio::test]
async fn bitcoin_alias_hits_ledger() {
    let harness = Harness::default();

    let response = harness.service.get_balance(SATOSHI, "btc").await;

    assert!(response.is_success(), "{response:?}");
    assert_eq!(response.into_data().unwrap().network_id, "bitcoin");
    assert_eq!(harness.ledger.calls(), 1);
    assert_eq!(harness.evm.calls(), 0);
}

/// Test that an Ethereum balance is answered by the EVM provider alone
#[tokio::test]
async fn ethereum_balance_hits_evm() {
    let harness = Harness::new(
        SpyEvm {
            native: U256::from(ONE_AND_A_HALF_ETH),
            ..SpyEvm::default()
        },
        SpyLedger::default(),
        SpyFeed::default(),
    );

    let response = harness.service.get_balance(VITALIK, "ethereum").await;

    assert!(response.is_success(), "{response:?}");
    let balance = response.into_data().unwrap();
    assert_eq!(balance.balance, "1.5");
    assert_eq!(balance.decimals, 18);
    assert_eq!(balance.symbol.as_deref(), Some("ETH"));
    assert_eq!(harness.evm.calls(), 1);
    assert_eq!(harness.ledger.calls(), 0);
}

/// Test that ERC-20 balances use the decimals reported by the contract
#[tokio::test]
async fn erc20_balance_uses_contract_decimals() {
    let harness = Harness::new(
        SpyEvm {
            token: U256::from(5_250_000u64),
            decimals: 6,
            ..SpyEvm::default()
        },
        SpyLedger::default(),
        SpyFeed::default(),
    );

    let asset_id = format!("eip155:1/erc20:{USDC}");
    let response = harness.service.get_balance(VITALIK, &asset_id).await;

    assert!(response.is_success(), "{response:?}");
    let balance = response.into_data().unwrap();
    assert_eq!(balance.balance, "5.25");
    assert_eq!(balance.decimals, 6);
    assert_eq!(balance.network_id, "ethereum");
    // balanceOf and decimals
    assert_eq!(harness.evm.calls(), 2);
}

/// Test that a malformed EVM address is rejected before any upstream call
#[tokio::test]
async fn invalid_evm_address() {
    let harness = Harness::default();

    let response = harness.service.get_balance("0x1234", "ethereum").await;

    assert_eq!(response.error_code(), Some(ErrorCode::InvalidAddress));
    assert_eq!(harness.evm.calls(), 0);
}

/// Test that gas on Bitcoin is an unsupported operation
#[tokio::test]
async fn gas_on_bitcoin_is_unsupported() {
    let harness = Harness::default();

    let response = harness.service.get_gas("bitcoin", None).await;

    assert!(!response.is_success());
    assert!(response.data().is_none());
    assert_eq!(response.error_code(), Some(ErrorCode::UnsupportedOperation));
    assert_eq!(harness.evm.calls(), 0);
    assert_eq!(harness.ledger.calls(), 0);
}

/// Test both gas report shapes
#[tokio::test]
async fn gas_modes() {
    let gwei = U256::from(1_000_000_000u64);
    let harness = Harness::new(
        SpyEvm {
            fees: FeeData {
                gas_price: Some(gwei * U256::from(30)),
                max_fee_per_gas: Some(gwei * U256::from(42)),
                max_priority_fee_per_gas: Some(gwei * U256::from(2)),
            },
            ..SpyEvm::default()
        },
        SpyLedger::default(),
        SpyFeed::default(),
    );

    let legacy = harness.service.get_gas("polygon", None).await.into_data().unwrap();
    assert_eq!(legacy.gas_price, "30000000000");
    assert_eq!(legacy.gas_price_gwei, "30");
    assert!(legacy.max_fee_per_gas.is_none());
    assert!(legacy.max_priority_fee_per_gas.is_none());

    let eip1559 = harness
        .service
        .get_gas("137", Some("eip1559"))
        .await
        .into_data()
        .unwrap();
    assert_eq!(eip1559.network_id, "polygon");
    assert_eq!(eip1559.max_fee_per_gas.as_deref(), Some("42000000000"));
    assert_eq!(eip1559.max_priority_fee_per_gas.as_deref(), Some("2000000000"));

    let unknown = harness.service.get_gas("ethereum", Some("turbo")).await;
    assert_eq!(unknown.error_code(), Some(ErrorCode::InvalidParameter));
}

/// Test that gas price defaults to zero when the upstream has none
#[tokio::test]
async fn gas_price_defaults_to_zero() {
    let harness = Harness::default();

    let gas = harness.service.get_gas("base", None).await.into_data().unwrap();

    assert_eq!(gas.gas_price, "0");
    assert_eq!(gas.gas_price_gwei, "0");
}

/// Test that parser errors reach the envelope with their own codes
#[tokio::test]
async fn asset_id_errors() {
    let harness = Harness::default();

    let invalid = harness.service.get_balance(VITALIK, "invalid:::::").await;
    assert_eq!(invalid.error_code(), Some(ErrorCode::InvalidFormat));

    let namespace = harness
        .service
        .get_price("eip155:1/cw20:0xabc", None)
        .await;
    assert_eq!(
        namespace.error_code(),
        Some(ErrorCode::UnsupportedNamespace)
    );

    let unknown_chain = harness
        .service
        .get_balance(VITALIK, "eip155:999/slip44:60")
        .await;
    assert_eq!(unknown_chain.error_code(), Some(ErrorCode::NotFound));

    assert_eq!(harness.evm.calls(), 0);
    assert_eq!(harness.feed.calls(), 0);
}

/// Test that a missing credential surfaces as its own code
#[tokio::test]
async fn missing_credential() {
    let harness = Harness::new(
        SpyEvm {
            failure: Some(Failure::MissingCredential),
            ..SpyEvm::default()
        },
        SpyLedger::default(),
        SpyFeed::default(),
    );

    let response = harness.service.get_balance(VITALIK, "ethereum").await;

    assert_eq!(response.error_code(), Some(ErrorCode::MissingCredential));
}

/// Test that upstream failures take the operation code and keep their detail
#[tokio::test]
async fn upstream_failure_details() {
    let harness = Harness::new(
        SpyEvm {
            failure: Some(Failure::Upstream(503)),
            ..SpyEvm::default()
        },
        SpyLedger::default(),
        SpyFeed::default(),
    );

    let response = harness.service.get_gas("ethereum", None).await;

    let error = response.into_error().unwrap();
    assert_eq!(error.code, ErrorCode::GasFetchError);
    assert_eq!(error.details.unwrap()["status"], 503);
}

/// Test that a self transfer is reported as a send of zero
#[tokio::test]
async fn bitcoin_self_transfer_is_send_of_zero() {
    let harness = Harness::new(
        SpyEvm::default(),
        SpyLedger {
            pages: vec![vec![utxo_tx(
                "self",
                vec![sats_input(SATOSHI, 100_000)],
                vec![sats_output(OTHER, 40_000), sats_output(SATOSHI, 59_500)],
            )]],
            ..SpyLedger::default()
        },
        SpyFeed::default(),
    );

    let response = harness
        .service
        .get_history(SATOSHI, "bitcoin", None, None)
        .await;

    let history = response.into_data().unwrap();
    assert_eq!(history.transactions.len(), 1);
    let tx = &history.transactions[0];
    assert_eq!(tx.direction, Direction::Send);
    assert_eq!(tx.value, "0");
    assert_eq!(tx.gas_price.as_deref(), Some("0"));
    assert_eq!(tx.fee.as_deref(), Some("0.000005"));
    assert_eq!(tx.status, TransactionStatus::Success);
    assert!(!history.has_more);
}

/// Test that Bitcoin history walks ledger pages until the requested page is covered
#[tokio::test]
async fn bitcoin_history_paging() {
    let harness = Harness::new(
        SpyEvm::default(),
        SpyLedger {
            pages: vec![receipts("a", 25, SATOSHI), receipts("b", 10, SATOSHI)],
            ..SpyLedger::default()
        },
        SpyFeed::default(),
    );

    let response = harness
        .service
        .get_history(SATOSHI, "bitcoin", Some(2), Some(20))
        .await;

    let history = response.into_data().unwrap();
    assert_eq!(history.page, 2);
    assert_eq!(history.transactions.len(), 15);
    assert_eq!(history.transactions[0].hash, "a20");
    assert_eq!(history.transactions[0].direction, Direction::Receive);
    assert_eq!(history.transactions[0].value, "0.0001");
    assert!(!history.has_more);
    assert_eq!(harness.ledger.calls(), 2);
}

/// Test that EVM history merges both directions newest first
#[tokio::test]
async fn evm_history_merges_directions() {
    let harness = Harness::new(
        SpyEvm {
            transfers: TransferPage {
                outgoing: vec![eth_transfer("0xout1", 100), eth_transfer("0xout2", 300)],
                incoming: vec![eth_transfer("0xin1", 200)],
                outgoing_page_key: None,
                incoming_page_key: Some("next".to_string()),
            },
            ..SpyEvm::default()
        },
        SpyLedger::default(),
        SpyFeed::default(),
    );

    let response = harness
        .service
        .get_history(VITALIK, "ethereum", Some(1), Some(2))
        .await;

    let history = response.into_data().unwrap();
    let hashes: Vec<&str> = history
        .transactions
        .iter()
        .map(|tx| tx.hash.as_str())
        .collect();
    assert_eq!(hashes, ["0xout2", "0xin1"]);
    assert_eq!(history.transactions[1].direction, Direction::Receive);
    assert_eq!(history.transactions[0].value, "1");
    assert_eq!(history.transactions[0].block_number, Some(300));
    assert!(history.has_more);
}

/// Test that the deepest EVM history page is served from the merged window
/// and anything past it is rejected before reaching the provider
#[tokio::test]
async fn evm_history_window_is_bounded() {
    let harness = Harness::new(
        SpyEvm {
            transfers: TransferPage {
                outgoing: (1501..=3000)
                    .rev()
                    .map(|block| eth_transfer(&format!("0xout{block}"), block))
                    .collect(),
                incoming: (1..=1000)
                    .rev()
                    .map(|block| eth_transfer(&format!("0xin{block}"), block))
                    .collect(),
                outgoing_page_key: None,
                incoming_page_key: None,
            },
            ..SpyEvm::default()
        },
        SpyLedger::default(),
        SpyFeed::default(),
    );

    let response = harness
        .service
        .get_history(VITALIK, "ethereum", Some(10), Some(100))
        .await;
    let history = response.into_data().unwrap();
    assert_eq!(history.transactions.len(), 100);
    assert_eq!(history.transactions[0].block_number, Some(2100));
    assert_eq!(history.transactions[99].block_number, Some(2001));
    assert!(
        history
            .transactions
            .iter()
            .all(|tx| tx.direction == Direction::Send)
    );
    assert_eq!(harness.evm.calls(), 1);

    let response = harness
        .service
        .get_history(VITALIK, "ethereum", Some(11), Some(100))
        .await;
    assert!(!response.is_success());
    let error = response.into_error().unwrap();
    assert_eq!(error.code, ErrorCode::InvalidParameter);
    assert_eq!(error.details.unwrap()["parameter"], "page");
    assert_eq!(harness.evm.calls(), 1);
}

/// Test that Bitcoin history past the walk window is rejected without a ledger call
#[tokio::test]
async fn bitcoin_history_window_is_bounded() {
    let harness = Harness::default();

    let response = harness
        .service
        .get_history(SATOSHI, "bitcoin", Some(21), Some(50))
        .await;

    let error = response.into_error().unwrap();
    assert_eq!(error.code, ErrorCode::InvalidParameter);
    assert_eq!(harness.ledger.calls(), 0);
}

/// Test that out-of-range paging is rejected
#[tokio::test]
async fn history_limit_bounds() {
    let harness = Harness::default();

    let response = harness
        .service
        .get_history(VITALIK, "ethereum", None, Some(500))
        .await;

    let error = response.into_error().unwrap();
    assert_eq!(error.code, ErrorCode::InvalidParameter);
    assert_eq!(error.details.unwrap()["parameter"], "limit");
    assert_eq!(harness.evm.calls(), 0);
}

/// Test that collection owners are flattened into one row per token
#[tokio::test]
async fn nft_owner_flattening() {
    let harness = Harness::new(
        SpyEvm {
            contract_owners: vec![
                ContractOwner {
                    owner_address: "0xaaa".to_string(),
                    token_balances: vec![
                        TokenBalance {
                            token_id: "1".to_string(),
                            balance: "1".to_string(),
                        },
                        TokenBalance {
                            token_id: "7".to_string(),
                            balance: "3".to_string(),
                        },
                    ],
                },
                ContractOwner {
                    owner_address: "0xbbb".to_string(),
                    token_balances: vec![],
                },
            ],
            ..SpyEvm::default()
        },
        SpyLedger::default(),
        SpyFeed::default(),
    );

    let response = harness
        .service
        .get_nft_owners(USDC, "ethereum", None)
        .await;

    let owners = response.into_data().unwrap().owners;
    assert_eq!(owners.len(), 3);
    assert_eq!(owners[1].owner_address, "0xaaa");
    assert_eq!(owners[1].token_id, "7");
    assert_eq!(owners[1].balance, "3");
    assert_eq!(owners[2].owner_address, "0xbbb");
    assert_eq!(owners[2].token_id, "");
    assert_eq!(owners[2].balance, "1");
}

/// Test that single-token owners each hold one copy
#[tokio::test]
async fn nft_token_owners() {
    let harness = Harness::new(
        SpyEvm {
            token_owners: vec!["0xaaa".to_string(), "0xbbb".to_string()],
            ..SpyEvm::default()
        },
        SpyLedger::default(),
        SpyFeed::default(),
    );

    let response = harness
        .service
        .get_nft_owners(USDC, "ethereum", Some("42"))
        .await;

    let data = response.into_data().unwrap();
    assert_eq!(data.token_id.as_deref(), Some("42"));
    assert!(
        data.owners
            .iter()
            .all(|owner| owner.token_id == "42" && owner.balance == "1")
    );
}

/// Test that NFT operations are unsupported on Bitcoin
#[tokio::test]
async fn nft_operations_on_bitcoin() {
    let harness = Harness::default();

    let owners = harness.service.get_nft_owners(USDC, "bitcoin", None).await;
    assert_eq!(owners.error_code(), Some(ErrorCode::UnsupportedOperation));

    let owned = harness.service.get_nfts_for_owner(SATOSHI, "btc", None).await;
    assert_eq!(owned.error_code(), Some(ErrorCode::UnsupportedOperation));

    let metadata = harness.service.get_nft_metadata("bitcoin").await;
    assert_eq!(metadata.error_code(), Some(ErrorCode::UnsupportedOperation));
}

/// Test NFT metadata for a token and for its collection
#[tokio::test]
async fn nft_metadata() {
    let harness = Harness::default();

    let token = harness
        .service
        .get_nft_metadata(&format!("eip155:1/erc721:{USDC}:42"))
        .await
        .into_data()
        .unwrap();
    assert_eq!(token.token_id.as_deref(), Some("42"));
    assert_eq!(token.name.as_deref(), Some("Punk #42"));

    let collection = harness
        .service
        .get_nft_metadata(&format!("eip155:1/erc1155:{USDC}"))
        .await
        .into_data()
        .unwrap();
    assert!(collection.token_id.is_none());
    assert_eq!(collection.total_supply.as_deref(), Some("10000"));

    let fungible = harness
        .service
        .get_nft_metadata(&format!("ethereum:{USDC}"))
        .await;
    assert_eq!(fungible.error_code(), Some(ErrorCode::UnsupportedAssetType));
}

/// Test that Bitcoin token metadata needs no upstream call
#[tokio::test]
async fn bitcoin_token_metadata_is_local() {
    let harness = Harness::default();

    let response = harness
        .service
        .get_token_metadata("bip122:000000000019d6689c085ae165831e93/slip44:0")
        .await;

    let metadata = response.into_data().unwrap();
    assert_eq!(metadata.symbol.as_deref(), Some("BTC"));
    assert_eq!(metadata.decimals, Some(8));
    assert_eq!(harness.ledger.calls(), 0);
    assert_eq!(harness.evm.calls(), 0);
}

/// Test ERC-20 token metadata
#[tokio::test]
async fn erc20_token_metadata() {
    let harness = Harness::new(
        SpyEvm {
            decimals: 6,
            ..SpyEvm::default()
        },
        SpyLedger::default(),
        SpyFeed::default(),
    );

    let response = harness
        .service
        .get_token_metadata(&format!("polygon:{USDC}"))
        .await;

    let metadata = response.into_data().unwrap();
    assert_eq!(metadata.symbol.as_deref(), Some("USDC"));
    assert_eq!(metadata.decimals, Some(6));
    assert_eq!(metadata.network_id, "polygon");
}

/// Test spot price and history
#[tokio::test]
async fn prices() {
    let harness = Harness::new(
        SpyEvm::default(),
        SpyLedger::default(),
        SpyFeed {
            price: 64_000.0,
            ..SpyFeed::default()
        },
    );

    let quote = harness
        .service
        .get_price("bitcoin", Some("EUR"))
        .await
        .into_data()
        .unwrap();
    assert_eq!(quote.currency, "eur");
    assert!((quote.price - 64_000.0).abs() < f64::EPSILON);
    assert_eq!(quote.change_24h, Some(-1.25));

    let history = harness
        .service
        .get_price_history("ethereum", Some(3), None)
        .await
        .into_data()
        .unwrap();
    assert_eq!(history.days, 3);
    assert_eq!(history.currency, "usd");
    assert_eq!(history.prices.len(), 3);

    let too_long = harness
        .service
        .get_price_history("ethereum", Some(4000), None)
        .await;
    assert_eq!(too_long.error_code(), Some(ErrorCode::InvalidParameter));
}

/// Test that NFTs have no price
#[tokio::test]
async fn nft_price_is_unsupported() {
    let harness = Harness::default();

    let response = harness
        .service
        .get_price(&format!("ethereum:{USDC}:1"), None)
        .await;

    assert_eq!(response.error_code(), Some(ErrorCode::UnsupportedAssetType));
    assert_eq!(harness.feed.calls(), 0);
}

/// Test that a portfolio values every holding and sums them
#[tokio::test]
async fn portfolio_total() {
    let harness = Harness::new(
        SpyEvm {
            native: U256::from(ONE_AND_A_HALF_ETH),
            ..SpyEvm::default()
        },
        SpyLedger {
            funded: 50_000_000,
            ..SpyLedger::default()
        },
        SpyFeed {
            price: 2_000.0,
            ..SpyFeed::default()
        },
    );

    let response = harness
        .service
        .get_portfolio(PortfolioRequest {
            holdings: vec![
                Holding {
                    address: VITALIK.to_string(),
                    asset_id: "ethereum".to_string(),
                },
                Holding {
                    address: SATOSHI.to_string(),
                    asset_id: "bitcoin".to_string(),
                },
            ],
            currency: None,
        })
        .await;

    assert!(response.is_success(), "{response:?}");
    let portfolio = response.into_data().unwrap();
    assert_eq!(portfolio.currency, "usd");
    assert_eq!(portfolio.holdings.len(), 2);
    assert!((portfolio.holdings[0].value - 3_000.0).abs() < 1e-9);
    assert!((portfolio.holdings[1].value - 1_000.0).abs() < 1e-9);
    assert!((portfolio.total_value - 4_000.0).abs() < 1e-9);
    assert_eq!(harness.feed.calls(), 2);
}

/// Test that one failed holding fails the whole portfolio
#[tokio::test]
async fn portfolio_fails_fast() {
    let harness = Harness::default();

    let response = harness
        .service
        .get_portfolio(PortfolioRequest {
            holdings: vec![
                Holding {
                    address: SATOSHI.to_string(),
                    asset_id: "bitcoin".to_string(),
                },
                Holding {
                    address: "not-an-address".to_string(),
                    asset_id: "ethereum".to_string(),
                },
            ],
            currency: None,
        })
        .await;

    assert!(response.data().is_none());
    assert_eq!(response.error_code(), Some(ErrorCode::InvalidAddress));
}

/// Test that an empty portfolio is rejected
#[tokio::test]
async fn empty_portfolio() {
    let harness = Harness::default();

    let response = harness
        .service
        .get_portfolio(PortfolioRequest {
            holdings: vec![],
            currency: Some("usd".to_string()),
        })
        .await;

    assert_eq!(response.error_code(), Some(ErrorCode::InvalidParameter));
}

/// Test the network listing
#[test]
fn networks_are_listed() {
    let harness = Harness::default();

    let networks = harness.service.list_networks().into_data().unwrap();

    let ids: Vec<String> = networks.iter().map(|network| network.id.to_string()).collect();
    assert_eq!(
        ids,
        ["ethereum", "polygon", "arbitrum", "optimism", "base", "bitcoin"]
    );
}
