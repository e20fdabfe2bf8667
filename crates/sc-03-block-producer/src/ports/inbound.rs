use crate::catalog::*;
use crate::domain::LedgerError;
use shared_types::Enveloped;

/// Ledger RPC surface. Responses carry the request's envelope.
pub trait LedgerApi: Send + Sync {
    fn next_account_nonce(
        &self,
        req: Enveloped<NextAccountNonceReq>,
    ) -> Result<Enveloped<NextAccountNonceResp>, LedgerError>;

    fn query_account_stable_balance(
        &self,
        req: Enveloped<QueryAccountStableBalanceReq>,
    ) -> Result<Enveloped<QueryAccountStableBalanceResp>, LedgerError>;

    fn query_account_covenant_balance(
        &self,
        req: Enveloped<QueryAccountCovenantBalanceReq>,
    ) -> Result<Enveloped<QueryAccountCovenantBalanceResp>, LedgerError>;

    fn add_tx(&self, req: Enveloped<AddTxReq>) -> Result<Enveloped<AddTxResp>, LedgerError>;

    fn query_sql_chain_profile(
        &self,
        req: Enveloped<QuerySqlChainProfileReq>,
    ) -> Result<Enveloped<QuerySqlChainProfileResp>, LedgerError>;
}
