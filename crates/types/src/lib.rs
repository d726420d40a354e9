pub mod color;
pub mod geometry;
pub mod ids;
pub mod invoice;
pub mod money;
pub mod page;
pub mod pixels;
pub mod seller;

pub use color::Color;
pub use geometry::{Rect, Size};
pub use ids::{OrderRef, ResourceUri};
pub use invoice::{
    Address, Customer, InvoiceData, LineItem, OrderSummary, PaymentInfo, PAYMENT_TERMS_DAYS,
};
pub use money::{amounts_match, format_zar, shipping_label, FREE_SHIPPING_LABEL};
pub use page::PageFormat;
pub use pixels::PixelBuffer;
pub use seller::{BankDetails, SellerProfile};
