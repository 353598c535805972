mod login;
mod signing;
