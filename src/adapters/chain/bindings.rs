//! Contract interfaces.
//!
//! Only the functions the client calls are declared; encoding and decoding
//! come from `sol!`.

use alloy::sol;

sol! {
    interface IPoolFactory {
        function allPools(uint256 index) external view returns (address);
        function allPoolsLength() external view returns (uint256);
    }

    interface ISimpleInterestPool {
        struct Loan {
            uint256 startEpoch;
            uint256 periods;
            uint256 principal;
            uint256 interest;
            uint256 totalPaid;
        }

        function name() external view returns (string);
        function previewDeposit(uint256 assets) external view returns (uint256);
        function convertToAssets(uint256 shares) external view returns (uint256);
        function interestRate() external view returns (uint256);
        function totalAssets() external view returns (uint256);
        function balanceOf(address owner) external view returns (uint256);
        function getLoan(address borrower) external view returns (Loan loan);
        function loanBalance(address borrower) external view returns (uint256);

        function deposit(uint256 assets, address receiver) external returns (uint256 shares);
        function withdraw(uint256 assets, address receiver, address owner) external returns (uint256 shares);
        function borrow(uint256 amount, address loanAgent) external returns (uint256 interest);
        function repay(uint256 amount, address loanAgent, address payee) external;
    }

    interface IWFIL {
        function balanceOf(address owner) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
        function deposit() external payable;
    }

    interface IStats {
        function hasPenalties(address agent) external view returns (bool);
    }
}
