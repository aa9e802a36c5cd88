pub mod netstat;
