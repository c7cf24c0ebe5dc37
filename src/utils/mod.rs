pub mod utils_net;
