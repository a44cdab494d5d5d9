//! Property registry contract ABI.

use alloy::primitives::{address, Address, Bytes};
use alloy::sol;
use alloy::sol_types::{SolCall, SolEvent};

use crate::registry::codec::OnChainKey;
use crate::registry::provider::{ContractCall, Receipt};

/// Address the registry was deployed at.
pub const DEFAULT_CONTRACT_ADDRESS: Address = address!("c89bc66c35Fc21fe7de40b00b4181D048c6760a3");

sol! {
    /// Emitted when a property changes hands.
    #[derive(Debug, PartialEq, Eq)]
    event PropertyTransferred(
        bytes32 indexed propertyId,
        address indexed oldOwner,
        address indexed newOwner
    );

    function registerProperty(bytes32 _propertyId) external;

    function transferOwnership(bytes32 _propertyId, address _newOwner) external;

    function getOwner(bytes32 _propertyId) external view returns (address);
}

pub fn register_property(contract: Address, key: OnChainKey) -> ContractCall {
    ContractCall {
        contract,
        method: registerPropertyCall::SIGNATURE,
        input: Bytes::from(registerPropertyCall { _propertyId: key }.abi_encode()),
    }
}

pub fn transfer_ownership(contract: Address, key: OnChainKey, new_owner: Address) -> ContractCall {
    ContractCall {
        contract,
        method: transferOwnershipCall::SIGNATURE,
        input: Bytes::from(
            transferOwnershipCall {
                _propertyId: key,
                _newOwner: new_owner,
            }
            .abi_encode(),
        ),
    }
}

pub fn get_owner(contract: Address, key: OnChainKey) -> ContractCall {
    ContractCall {
        contract,
        method: getOwnerCall::SIGNATURE,
        input: Bytes::from(getOwnerCall { _propertyId: key }.abi_encode()),
    }
}

/// Decode the return value of `getOwner`.
pub fn decode_owner(output: &[u8]) -> Result<Address, alloy::sol_types::Error> {
    getOwnerCall::abi_decode_returns(output)
}

/// Transfer events emitted by `contract` in a receipt.
pub fn transfers_in(contract: Address, receipt: &Receipt) -> Vec<PropertyTransferred> {
    receipt
        .logs
        .iter()
        .filter(|log| log.address == contract)
        .filter_map(|log| PropertyTransferred::decode_log(log).ok())
        .map(|decoded| decoded.data)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::codec::encode;
    use alloy::primitives::{Log, TxHash};
    use alloy::sol_types::SolValue;

    #[test]
    fn test_register_calldata() {
        let key = encode("Lot-42").unwrap();
        let call = register_property(DEFAULT_CONTRACT_ADDRESS, key);
        assert_eq!(call.method, "registerProperty(bytes32)");
        assert_eq!(&call.input[..4], registerPropertyCall::SELECTOR.as_slice());
        assert_eq!(&call.input[4..], key.as_slice());
    }

    #[test]
    fn test_transfer_calldata() {
        let key = encode("Lot-42").unwrap();
        let owner = Address::repeat_byte(0xab);
        let call = transfer_ownership(DEFAULT_CONTRACT_ADDRESS, key, owner);
        assert_eq!(call.method, "transferOwnership(bytes32,address)");
        assert_eq!(call.input.len(), 4 + 64);
        let decoded = transferOwnershipCall::abi_decode(&call.input).unwrap();
        assert_eq!(decoded._propertyId, key);
        assert_eq!(decoded._newOwner, owner);
    }

    #[test]
    fn test_decode_owner() {
        let owner = Address::repeat_byte(0x11);
        let output = owner.abi_encode();
        assert_eq!(decode_owner(&output).unwrap(), owner);
        assert!(decode_owner(&[0u8; 3]).is_err());
    }

    #[test]
    fn test_transfers_in_receipt() {
        let event = PropertyTransferred {
            propertyId: encode("Lot-42").unwrap(),
            oldOwner: Address::repeat_byte(1),
            newOwner: Address::repeat_byte(2),
        };
        let ours = Log {
            address: DEFAULT_CONTRACT_ADDRESS,
            data: event.encode_log_data(),
        };
        let foreign = Log {
            address: Address::repeat_byte(9),
            data: event.encode_log_data(),
        };
        let receipt = Receipt {
            tx_hash: TxHash::repeat_byte(7),
            block_number: 10,
            success: true,
            logs: vec![ours, foreign],
        };

        let transfers = transfers_in(DEFAULT_CONTRACT_ADDRESS, &receipt);
        assert_eq!(transfers, vec![event]);
    }
}
