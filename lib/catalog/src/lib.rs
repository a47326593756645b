pub mod bands;
mod de;
pub mod mask;
pub mod resolver;
pub mod schema;
pub mod traits;
pub mod types;

pub use bands::band_id;
pub use mask::Project;
pub use resolver::Resolver;
pub use traits::{
    CatalogStore, GetBrandsRequest, GetModelsRequest, BrandsPage, ModelsPage,
};
pub use types::{
    Battery, Brand, Compliance, Compliances, DeviceTemplate, Dimensions, FirmwareProfile,
    FirmwareVersion, HardwareVersion, KeyProvisioning, KeySecurity, Limits, Model,
    OperatingConditions, Photos, Videos, VersionIdentifiers,
};
