// mdpreview-common: wire types shared by the editor bridge and preview renderers

pub mod protocol;
pub mod types;
