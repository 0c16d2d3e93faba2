pub mod seedbox_server;
