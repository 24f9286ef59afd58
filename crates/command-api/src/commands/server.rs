use serde::{Deserialize, Serialize};

use crate::envelope::AuctionCommand;
use crate::result_code::ResultCode;
use crate::validation::ValidationError;

/// Asks the server to identify itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetServerInfo {}

impl AuctionCommand for GetServerInfo {
    const TYPE: &'static str = "GetServerInfo";
    const RESULT_CODES: &'static [ResultCode] = &[ResultCode::ServerInfo];

    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}
